//! Types handed to the external renderer.
//!
//! These are serialized into `manifest.json` at the output root. The renderer
//! computes the justified layout from each record's gallery size, builds the
//! markup, and percent-encodes the paths.

use serde::{Deserialize, Serialize};

/// One encoded tier file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierOutput {
    /// Output-root-relative URL path, e.g. `gallery/trips/IMG_1.avif`.
    pub path: String,
    pub width: u32,
    pub height: u32,
}

/// Everything the renderer needs about one processed source image.
///
/// Gallery and lightbox sizes are scaled independently from the same upright
/// source dimensions; neither is derived from the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Input-root-relative URL path of the source file.
    pub source_path: String,
    /// Display label derived from the filename.
    pub label: String,
    pub gallery: TierOutput,
    pub lightbox: TierOutput,
    /// Output-root-relative path of the byte-for-byte copy, when originals are included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
}

/// Page-level settings passed through to the renderer untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSettings {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    /// Gap between photos in the justified layout, in pixels.
    pub margin: u32,
    pub favicon_emoji: String,
    /// Whether the lightbox should offer a download of the original.
    pub download: bool,
}

/// Default page title when no header is given.
pub const DEFAULT_TITLE: &str = "Gallery";

/// Default favicon emoji.
pub const DEFAULT_FAVICON_EMOJI: &str = "\u{1F4F8}";

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            header: None,
            footer: None,
            margin: 4,
            favicon_emoji: DEFAULT_FAVICON_EMOJI.to_string(),
            download: false,
        }
    }
}

/// The single file the renderer consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub page: PageSettings,
    /// Row height the justified layout should aim for, in CSS pixels.
    pub target_row_height: u32,
    /// Records in final display order.
    pub images: Vec<ImageRecord>,
}
