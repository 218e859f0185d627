//! High-level image operations.
//!
//! These functions combine tier calculations with backend execution.

use super::backend::{BackendError, DecodedFrame, ImageBackend};
use super::params::{EncodeParams, TierSpec};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Produce one tier from an already-decoded frame.
///
/// Target dimensions come from the tier's sizing rule applied to the frame's
/// upright dimensions. Returns the dimensions actually written.
pub fn encode_tier(
    backend: &impl ImageBackend,
    frame: &DecodedFrame,
    spec: &TierSpec,
    output: &Path,
) -> Result<(u32, u32)> {
    let (width, height) = spec.target_dimensions(frame.dimensions());
    backend.encode(
        frame,
        &EncodeParams {
            output: output.to_path_buf(),
            width,
            height,
            quality: spec.quality,
            speed: spec.speed,
        },
    )?;
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GalleryConfig, RunMode};
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::params::TierSpecs;

    fn specs() -> TierSpecs {
        TierSpecs::resolve(&GalleryConfig::default(), &RunMode::Normal)
    }

    #[test]
    fn gallery_and_lightbox_scale_independently() {
        let backend = MockBackend::with_dimensions(&[("big.jpg", (4000, 3000))]);
        let frame = backend.decode(Path::new("big.jpg")).unwrap();
        let specs = specs();

        let gallery = encode_tier(&backend, &frame, &specs.gallery, Path::new("g.avif")).unwrap();
        let lightbox =
            encode_tier(&backend, &frame, &specs.lightbox, Path::new("l.avif")).unwrap();

        assert_eq!(gallery, (640, 480));
        assert_eq!(lightbox, (3000, 2250));
    }

    #[test]
    fn small_source_passes_through_both_tiers() {
        let backend = MockBackend::with_dimensions(&[("small.jpg", (200, 150))]);
        let frame = backend.decode(Path::new("small.jpg")).unwrap();
        let specs = specs();

        for spec in specs.iter() {
            let dims = encode_tier(&backend, &frame, spec, Path::new("out.avif")).unwrap();
            assert_eq!(dims, (200, 150));
        }
    }

    #[test]
    fn encode_receives_tier_quality_and_speed() {
        let backend = MockBackend::with_dimensions(&[("a.jpg", (1000, 1000))]);
        let frame = backend.decode(Path::new("a.jpg")).unwrap();
        let specs = specs();

        encode_tier(&backend, &frame, &specs.lightbox, Path::new("/out/l.avif")).unwrap();

        let ops = backend.get_operations();
        assert_eq!(
            ops[1],
            RecordedOp::Encode {
                output: "/out/l.avif".to_string(),
                width: 1000,
                height: 1000,
                quality: 85,
                speed: 4,
            }
        );
    }
}
