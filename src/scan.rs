//! Source image discovery.
//!
//! Walks the input directory recursively and collects every regular file whose
//! extension (case-insensitive) is a supported raster format:
//!
//! ```text
//! photos/                     # Input root
//! ├── config.toml             # Ignored (not an image)
//! ├── beach.JPG               # → "beach.JPG"
//! ├── trips/
//! │   ├── 2019/
//! │   │   └── IMG_0042.jpeg   # → "trips/2019/IMG_0042.jpeg"
//! │   └── notes.txt           # Ignored
//! └── scans/
//!     └── negative-01.tiff    # → "scans/negative-01.tiff"
//! ```
//!
//! ## Ordering
//!
//! Results are sorted by the forward-slash relative path compared as a plain
//! string. This is deliberately not [`Path`] ordering: `a b/x.jpg` sorts before
//! `a/x.jpg` because `' '` < `'/'`. Two walks of an unchanged tree always yield
//! the same order, whatever the filesystem's directory iteration order.

use crate::imaging::supported_input_extensions;
use crate::naming::url_path;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Input directory not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Failed to walk input directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// One discovered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Path relative to the input root.
    pub relative_path: PathBuf,
    /// Forward-slash form of `relative_path`; the ordering key.
    pub key: String,
    /// Location to read from.
    pub absolute_path: PathBuf,
}

/// Check if a path has a supported image extension.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| supported_input_extensions().contains(&ext.as_str()))
}

/// Discover all supported images below `root`, sorted by relative path.
///
/// `exclude` prunes a subtree from the walk (the output directory, when it
/// lives inside the input root).
pub fn discover_images(
    root: &Path,
    exclude: Option<&Path>,
) -> Result<Vec<SourceImage>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::SourceNotFound(root.to_path_buf()));
    }

    let mut images = Vec::new();
    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| exclude.is_none_or(|excluded| entry.path() != excluded));

    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        // `is_file` follows symlinks, so linked photos are included
        if !path.is_file() || !is_supported_image(path) {
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        images.push(SourceImage {
            relative_path: relative.to_path_buf(),
            key: url_path(relative),
            absolute_path: path.to_path_buf(),
        });
    }

    images.sort_by(|a, b| a.key.cmp(&b.key));
    tracing::debug!("discovered {} images in {}", images.len(), root.display());
    Ok(images)
}
