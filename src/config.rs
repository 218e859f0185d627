//! Run configuration.
//!
//! Two layers feed a run:
//!
//! - **`config.toml`**: tier sizes, encoder settings and worker count. Stock
//!   defaults are overridden by a user file (`--config FILE`, or `config.toml` in
//!   the input directory). Files are sparse: override only what you need.
//! - **[`RunMode`]**: normal vs. fast-iteration, chosen on the command line.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [gallery]
//! target_row_height = 320   # Row height the client-side layout aims for (px)
//! height_scale = 1.5        # Gallery tier height = round(row height × scale)
//! quality = 75              # AVIF quality (1-100)
//! speed = 6                 # AVIF encoder speed (1 = slowest, 10 = fastest)
//!
//! [lightbox]
//! max_dimension = 3000      # Cap on the longer edge (px)
//! quality = 85
//! speed = 4
//!
//! [fast]                    # Both tiers under --dev
//! quality = 30
//! speed = 10
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Settings loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Grid tier: height-capped.
    pub gallery: GalleryTierConfig,
    /// Full-view tier: longer-edge-capped.
    pub lightbox: LightboxTierConfig,
    /// Encoder settings used for both tiers in fast-iteration mode.
    pub fast: FastConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gallery.target_row_height == 0 {
            return Err(ConfigError::Validation(
                "gallery.target_row_height must be non-zero".into(),
            ));
        }
        if !(self.gallery.height_scale.is_finite() && self.gallery.height_scale > 0.0) {
            return Err(ConfigError::Validation(
                "gallery.height_scale must be a positive number".into(),
            ));
        }
        if self.lightbox.max_dimension == 0 {
            return Err(ConfigError::Validation(
                "lightbox.max_dimension must be non-zero".into(),
            ));
        }
        for (key, quality) in [
            ("gallery.quality", self.gallery.quality),
            ("lightbox.quality", self.lightbox.quality),
            ("fast.quality", self.fast.quality),
        ] {
            if !(1..=100).contains(&quality) {
                return Err(ConfigError::Validation(format!("{key} must be 1-100")));
            }
        }
        for (key, speed) in [
            ("gallery.speed", self.gallery.speed),
            ("lightbox.speed", self.lightbox.speed),
            ("fast.speed", self.fast.speed),
        ] {
            if !(1..=10).contains(&speed) {
                return Err(ConfigError::Validation(format!("{key} must be 1-10")));
            }
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Gallery (grid) tier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryTierConfig {
    /// Row height the client-side justified layout targets, in CSS pixels.
    pub target_row_height: u32,
    /// Oversampling factor so grid images stay sharp on dense displays.
    pub height_scale: f64,
    pub quality: u32,
    pub speed: u32,
}

impl GalleryTierConfig {
    /// Height cap for gallery outputs: `round(target_row_height × height_scale)`.
    pub fn target_height(&self) -> u32 {
        ((self.target_row_height as f64 * self.height_scale).round() as u32).max(1)
    }
}

impl Default for GalleryTierConfig {
    fn default() -> Self {
        Self {
            target_row_height: 320,
            height_scale: 1.5,
            quality: 75,
            speed: 6,
        }
    }
}

/// Lightbox (full view) tier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightboxTierConfig {
    /// Cap on the longer edge, in pixels.
    pub max_dimension: u32,
    pub quality: u32,
    pub speed: u32,
}

impl Default for LightboxTierConfig {
    fn default() -> Self {
        Self {
            max_dimension: 3000,
            quality: 85,
            speed: 4,
        }
    }
}

/// Fast-iteration encoder settings, shared by both tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FastConfig {
    pub quality: u32,
    pub speed: u32,
}

impl Default for FastConfig {
    fn default() -> Self {
        Self {
            quality: 30,
            speed: 10,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// How hard the encoder works, chosen once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Per-tier quality/speed from config.
    Normal,
    /// Fastest encoding for quick iteration, optionally on a prefix of the images.
    FastIteration { limit: Option<NonZeroUsize> },
}

impl RunMode {
    /// Build a run mode from the `--dev` / `--limit` flags.
    ///
    /// A limit is only meaningful in fast-iteration mode and must be positive.
    pub fn from_flags(dev: bool, limit: Option<usize>) -> Result<Self, ConfigError> {
        match (dev, limit) {
            (false, None) => Ok(Self::Normal),
            (false, Some(_)) => Err(ConfigError::Validation("--limit requires --dev".into())),
            (true, None) => Ok(Self::FastIteration { limit: None }),
            (true, Some(n)) => NonZeroUsize::new(n)
                .map(|limit| Self::FastIteration { limit: Some(limit) })
                .ok_or_else(|| {
                    ConfigError::Validation("--limit must be a positive integer".into())
                }),
        }
    }

    /// Number of images to keep after enumeration, if truncating.
    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::Normal => None,
            Self::FastIteration { limit } => limit.map(NonZeroUsize::get),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(GalleryConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from an explicit file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<GalleryConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    resolve_config(Some(toml::from_str(&content)?))
}

/// Load `config.toml` from the input directory, falling back to stock defaults.
pub fn load_config(input_root: &Path) -> Result<GalleryConfig, ConfigError> {
    let config_path = input_root.join("config.toml");
    if !config_path.exists() {
        return resolve_config(None);
    }
    load_config_file(&config_path)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Justified Gal Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file at <INPUT>/config.toml or pass it with --config.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Gallery tier: images laid out in the justified grid
# ---------------------------------------------------------------------------
[gallery]
# Row height the client-side layout aims for, in CSS pixels.
# Keep in sync with the renderer's layout settings.
target_row_height = 320

# Gallery images are capped at round(target_row_height * height_scale)
# pixels tall, so they stay sharp on high-density displays.
height_scale = 1.5

# AVIF quality (1 = worst, 100 = best) and encoder speed (1 = slowest, 10 = fastest).
quality = 75
speed = 6

# ---------------------------------------------------------------------------
# Lightbox tier: full-view images
# ---------------------------------------------------------------------------
[lightbox]
# Cap on the longer edge, in pixels. Smaller sources are never upscaled.
max_dimension = 3000
quality = 85
speed = 4

# ---------------------------------------------------------------------------
# Fast iteration (--dev): used for both tiers
# ---------------------------------------------------------------------------
[fast]
quality = 30
speed = 10

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
