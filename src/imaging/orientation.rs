//! EXIF orientation handling.
//!
//! Cameras store sensor-order pixels plus an `Orientation` tag describing how to
//! display them. Decoders hand back sensor order, so every frame is physically
//! rotated/flipped once after decoding. Tier outputs are written without EXIF,
//! which leaves them upright with no flag to re-apply.

use exif::{In, Reader, Tag};
use image::DynamicImage;
use std::io::Cursor;

/// The eight EXIF orientations, named by the transform that makes them upright.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Normal,
    MirroredHorizontal,
    Rotate180,
    MirroredVertical,
    /// Mirror across the top-left/bottom-right diagonal.
    Transpose,
    Rotate90,
    /// Mirror across the top-right/bottom-left diagonal.
    Transverse,
    Rotate270,
}

impl Orientation {
    /// Read the orientation tag from an encoded image held in memory.
    ///
    /// Missing, unreadable, or out-of-range tags all mean [`Orientation::Normal`];
    /// formats without EXIF support (GIF, BMP) land here too.
    pub fn from_encoded(bytes: &[u8]) -> Self {
        let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
            Ok(exif) => exif,
            Err(e) => {
                tracing::trace!("no EXIF orientation: {e}");
                return Self::Normal;
            }
        };
        exif.get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Self::from)
            .unwrap_or_default()
    }

    /// Whether applying this orientation swaps width and height.
    #[cfg(test)]
    fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Self::Transpose | Self::Rotate90 | Self::Transverse | Self::Rotate270
        )
    }

    /// Physically transform `image` into display orientation.
    #[must_use]
    pub fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            Self::Normal => image,
            Self::MirroredHorizontal => image.fliph(),
            Self::Rotate180 => image.rotate180(),
            Self::MirroredVertical => image.flipv(),
            Self::Transpose => image.fliph().rotate270(),
            Self::Rotate90 => image.rotate90(),
            Self::Transverse => image.fliph().rotate90(),
            Self::Rotate270 => image.rotate270(),
        }
    }
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Self::MirroredHorizontal,
            3 => Self::Rotate180,
            4 => Self::MirroredVertical,
            5 => Self::Transpose,
            6 => Self::Rotate90,
            7 => Self::Transverse,
            8 => Self::Rotate270,
            _ => Self::Normal,
        }
    }
}
