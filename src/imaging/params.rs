//! Parameter types for tier encoding.
//!
//! These structs describe *what* to produce, not *how* to produce it. They are the
//! interface between the orchestrator (which decides which tiers exist and where
//! they go) and the [`backend`](super::backend) (which does the pixel work).
//!
//! ## Types
//!
//! - [`Quality`]: AVIF encoding quality (1–100). Clamped on construction.
//! - [`Speed`]: AVIF encoder speed (1 = slowest/best, 10 = fastest). Clamped on construction.
//! - [`SizingRule`]: how a tier constrains the source dimensions.
//! - [`TierSpec`]: one named tier: sizing rule + quality + speed.
//! - [`TierSpecs`]: the two tiers of a run, resolved once from config and run mode.
//! - [`EncodeParams`]: full specification for one encode: output path, exact size, quality, speed.

use super::calculations::{scale_to_height, scale_to_max_dimension};
use crate::config::{GalleryConfig, RunMode};
use std::fmt;
use std::path::PathBuf;

/// Quality setting for lossy AVIF encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// AVIF encoder speed (1-10). Higher is faster with larger files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Speed(u8);

impl Speed {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 10) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// The two output resolutions produced for every source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Small tier laid out in the justified grid.
    Gallery,
    /// Large tier shown in the full-view lightbox.
    Lightbox,
}

impl Tier {
    /// Name of the output subdirectory holding this tier.
    pub fn dir_name(self) -> &'static str {
        match self {
            Tier::Gallery => "gallery",
            Tier::Lightbox => "lightbox",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// How a tier constrains source dimensions. Neither rule ever upscales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingRule {
    /// Cap the output height.
    MaxHeight(u32),
    /// Cap the longer of width and height.
    MaxDimension(u32),
}

impl SizingRule {
    /// Apply the rule to an (upright) source size.
    pub fn apply(self, original: (u32, u32)) -> (u32, u32) {
        match self {
            SizingRule::MaxHeight(target) => scale_to_height(original, target),
            SizingRule::MaxDimension(target) => scale_to_max_dimension(original, target),
        }
    }
}

/// A named sizing + encoding policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierSpec {
    pub tier: Tier,
    pub rule: SizingRule,
    pub quality: Quality,
    pub speed: Speed,
}

impl TierSpec {
    pub fn target_dimensions(&self, original: (u32, u32)) -> (u32, u32) {
        self.rule.apply(original)
    }
}

/// Both tiers for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierSpecs {
    pub gallery: TierSpec,
    pub lightbox: TierSpec,
}

impl TierSpecs {
    /// Resolve the concrete tier policies for a run.
    ///
    /// Fast-iteration mode swaps both tiers to the `[fast]` quality/speed pair;
    /// sizing rules are identical in both modes so layouts match.
    pub fn resolve(config: &GalleryConfig, mode: &RunMode) -> Self {
        let (gallery_quality, gallery_speed, lightbox_quality, lightbox_speed) = match mode {
            RunMode::Normal => (
                config.gallery.quality,
                config.gallery.speed,
                config.lightbox.quality,
                config.lightbox.speed,
            ),
            RunMode::FastIteration { .. } => (
                config.fast.quality,
                config.fast.speed,
                config.fast.quality,
                config.fast.speed,
            ),
        };

        Self {
            gallery: TierSpec {
                tier: Tier::Gallery,
                rule: SizingRule::MaxHeight(config.gallery.target_height()),
                quality: Quality::new(gallery_quality),
                speed: Speed::new(gallery_speed),
            },
            lightbox: TierSpec {
                tier: Tier::Lightbox,
                rule: SizingRule::MaxDimension(config.lightbox.max_dimension),
                quality: Quality::new(lightbox_quality),
                speed: Speed::new(lightbox_speed),
            },
        }
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = &TierSpec> {
        [&self.gallery, &self.lightbox].into_iter()
    }
}

/// Parameters for a single tier encode.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams {
    pub output: PathBuf,
    /// Exact output dimensions; the backend resamples only when these differ
    /// from the frame's dimensions.
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
    pub speed: Speed,
}
