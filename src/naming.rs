//! Names and paths derived from a source file's relative path.
//!
//! ## Display Labels
//!
//! Every image gets a human-readable label from its filename stem: underscores
//! and dashes become spaces and surrounding whitespace is trimmed.
//! - `my_sunset-photo.JPG` → "my sunset photo"
//! - `trips/2019/IMG_0042.jpeg` → "IMG 0042"
//! - `___.png` → "Image" (nothing left, placeholder)
//!
//! ## Output Paths
//!
//! Tier files keep the source's relative location and swap the extension:
//! `trips/2019/IMG_0042.jpeg` → `gallery/trips/2019/IMG_0042.avif`. Paths handed
//! to the renderer are forward-slash separated and never contain `..`; percent
//! encoding is left to the renderer.

use std::path::{Component, Path, PathBuf};

/// Label used when a filename has nothing left after cleanup.
pub const PLACEHOLDER_LABEL: &str = "Image";

/// Extension of every tier output.
pub const TIER_EXTENSION: &str = "avif";

/// Derive a display label from a file path.
pub fn label_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let label = stem.replace(['_', '-'], " ");
    let label = label.trim();
    if label.is_empty() {
        PLACEHOLDER_LABEL.to_string()
    } else {
        label.to_string()
    }
}

/// Relative path of a tier output for a source: same location, `.avif` extension.
pub fn tier_relative_path(relative: &Path) -> PathBuf {
    relative.with_extension(TIER_EXTENSION)
}

/// Join the normal components of a relative path with `/`.
///
/// Root, prefix, `.` and `..` components are dropped, so the result is always a
/// plain relative URL path.
pub fn url_path(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// URL path of a file below one of the output subdirectories.
///
/// ```
/// # use justified_gal::naming::output_url;
/// # use std::path::Path;
/// assert_eq!(output_url("gallery", Path::new("a/b.avif")), "gallery/a/b.avif");
/// ```
pub fn output_url(root: &str, relative: &Path) -> String {
    format!("{}/{}", root, url_path(relative))
}
