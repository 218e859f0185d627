//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the pipeline needs:
//! decode a source into an upright [`DecodedFrame`], and encode a frame at
//! exact dimensions into a tier file.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend): pure Rust, everything
//! statically linked into the binary.

use super::params::EncodeParams;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("unsupported color mode: {0}")]
    UnsupportedColorMode(String),
    #[error("AVIF encode failed: {0}")]
    Encode(String),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One source image after decoding and orientation correction.
///
/// Both tiers are derived from the same frame; it is never mutated.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    image: DynamicImage,
}

impl DecodedFrame {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Upright (post-orientation) dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// Trait for image processing backends.
///
/// `Sync` so one backend can be shared by every rayon worker.
pub trait ImageBackend: Sync {
    /// Decode a source file and normalize its orientation.
    fn decode(&self, path: &Path) -> Result<DecodedFrame, BackendError>;

    /// Resample (if needed), canonicalize, encode and write one tier.
    ///
    /// On error no file is left at `params.output`.
    fn encode(&self, frame: &DecodedFrame, params: &EncodeParams) -> Result<(), BackendError>;
}
