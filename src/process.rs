//! Pipeline orchestration: discovered images → tier files + ordered records.
//!
//! For every selected source image:
//!
//! 1. Decode once; orientation is normalized by the backend.
//! 2. Encode the gallery and lightbox tiers from that single frame.
//! 3. Optionally copy the untouched source to `original/`.
//! 4. Assemble an [`ImageRecord`].
//!
//! ## Output Structure
//!
//! ```text
//! site/
//! ├── manifest.json              # Page settings + ordered records for the renderer
//! ├── gallery/
//! │   └── trips/IMG_0042.avif    # Height-capped grid image
//! ├── lightbox/
//! │   └── trips/IMG_0042.avif    # Longer-edge-capped full view
//! └── original/                  # Only with --download
//!     └── trips/IMG_0042.jpeg
//! ```
//!
//! ## Parallel Processing
//!
//! Images are processed in parallel using [rayon](https://docs.rs/rayon). The
//! records come back in enumeration order regardless of completion order, and
//! the first failing image aborts the run: no further images start and no
//! manifest is written.

use crate::config::{GalleryConfig, RunMode};
use crate::imaging::{
    BackendError, ImageBackend, RustBackend, Tier, TierSpec, TierSpecs, encode_tier,
};
use crate::naming::{label_from_path, output_url, tier_relative_path};
use crate::scan::{ScanError, SourceImage, discover_images};
use crate::types::{ImageRecord, Manifest, PageSettings, TierOutput};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Name of the hand-off file written at the output root.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Output subdirectory for byte-for-byte source copies.
pub const ORIGINAL_DIR: &str = "original";

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("No supported images found in {}", .0.display())]
    EmptyInputSet(PathBuf),
    #[error("Output directory {} already exists (pass --overwrite to replace it)", .0.display())]
    OutputExists(PathBuf),
    #[error("Output directory {} contains the input directory", .0.display())]
    OutputContainsInput(PathBuf),
    #[error(
        "{} and {} would both be written to {}",
        first.display(),
        second.display(),
        output.display()
    )]
    OutputCollision {
        first: PathBuf,
        second: PathBuf,
        /// Tier path both sources map to, relative to a tier directory.
        output: PathBuf,
    },
    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("Failed to produce {tier} tier for {}: {source}", path.display())]
    Tier {
        path: PathBuf,
        tier: Tier,
        #[source]
        source: BackendError,
    },
    #[error("Failed to copy original {}: {source}", path.display())]
    Passthrough {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Order in which selected images are processed and presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Sorted relative-path order from discovery.
    #[default]
    Enumeration,
    /// Randomized once before truncation. A seed makes it reproducible.
    Shuffled { seed: Option<u64> },
}

/// Everything the per-image step needs, resolved once per run.
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    pub specs: TierSpecs,
    /// Copy each source unmodified into `original/`.
    pub include_originals: bool,
    pub order: Order,
    /// Keep only this many images after ordering.
    pub limit: Option<usize>,
}

impl ProcessConfig {
    /// Build a ProcessConfig from the loaded config and the run mode.
    pub fn from_config(config: &GalleryConfig, mode: &RunMode) -> Self {
        Self {
            specs: TierSpecs::resolve(config, mode),
            include_originals: false,
            order: Order::Enumeration,
            limit: mode.limit(),
        }
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self::from_config(&GalleryConfig::default(), &RunMode::Normal)
    }
}

/// Settings for a full build: processing plus output bootstrap and page settings.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub process: ProcessConfig,
    /// Replace the contents of an existing output directory.
    pub overwrite: bool,
    pub page: PageSettings,
    pub target_row_height: u32,
}

/// Progress events emitted while images are processed.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    Started {
        image_count: usize,
    },
    /// One image finished. `index` is its 1-based position in the final order;
    /// events arrive in completion order.
    ImageProcessed {
        index: usize,
        label: String,
        source_path: String,
        variants: Vec<VariantInfo>,
    },
}

#[derive(Debug, Clone)]
pub struct VariantInfo {
    pub label: String,
    pub status: VariantStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantStatus {
    Encoded,
    Copied,
}

/// Apply the run's ordering, then truncate to the limit.
pub fn select_images(
    mut images: Vec<SourceImage>,
    order: Order,
    limit: Option<usize>,
) -> Vec<SourceImage> {
    match order {
        Order::Enumeration => {}
        Order::Shuffled { seed: Some(seed) } => {
            images.shuffle(&mut StdRng::seed_from_u64(seed));
        }
        Order::Shuffled { seed: None } => images.shuffle(&mut rand::thread_rng()),
    }
    if let Some(limit) = limit {
        images.truncate(limit);
    }
    images
}

/// Make sure `output_dir` exists and is empty.
///
/// An existing directory is only cleared when `overwrite` is set.
pub fn prepare_output_dir(output_dir: &Path, overwrite: bool) -> Result<(), ProcessError> {
    if output_dir.exists() {
        if !overwrite {
            return Err(ProcessError::OutputExists(output_dir.to_path_buf()));
        }
        for entry in fs::read_dir(output_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(entry.path())?;
            } else {
                fs::remove_file(entry.path())?;
            }
        }
        tracing::debug!("cleared {}", output_dir.display());
    }
    fs::create_dir_all(output_dir)?;
    Ok(())
}

/// Reject selections where two sources map to the same tier file.
///
/// Tier files drop the source extension, so `a.jpg` and `a.png` in the same
/// directory would overwrite each other.
pub fn check_output_collisions(images: &[SourceImage]) -> Result<(), ProcessError> {
    let mut seen: HashMap<PathBuf, &SourceImage> = HashMap::with_capacity(images.len());
    for image in images {
        let output = tier_relative_path(&image.relative_path);
        if let Some(first) = seen.get(&output) {
            return Err(ProcessError::OutputCollision {
                first: first.relative_path.clone(),
                second: image.relative_path.clone(),
                output,
            });
        }
        seen.insert(output, image);
    }
    Ok(())
}

/// Discover, select, process and hand off with the pure-Rust backend.
pub fn build(
    input_root: &Path,
    output_dir: &Path,
    options: &BuildOptions,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<Manifest, ProcessError> {
    let backend = RustBackend::new();
    build_with_backend(&backend, input_root, output_dir, options, progress)
}

/// Full build using a specific backend (allows testing with mock).
///
/// The output directory is only touched once discovery found at least one
/// image, and `manifest.json` is only written once every image succeeded.
pub fn build_with_backend(
    backend: &impl ImageBackend,
    input_root: &Path,
    output_dir: &Path,
    options: &BuildOptions,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<Manifest, ProcessError> {
    if input_root.starts_with(output_dir) {
        return Err(ProcessError::OutputContainsInput(output_dir.to_path_buf()));
    }
    let exclude = output_dir.starts_with(input_root).then_some(output_dir);
    let discovered = discover_images(input_root, exclude)?;
    if discovered.is_empty() {
        return Err(ProcessError::EmptyInputSet(input_root.to_path_buf()));
    }

    let images = select_images(discovered, options.process.order, options.process.limit);
    check_output_collisions(&images)?;
    prepare_output_dir(output_dir, options.overwrite)?;

    let records = process_with_backend(backend, &images, output_dir, &options.process, progress)?;
    let manifest = Manifest {
        page: options.page.clone(),
        target_row_height: options.target_row_height,
        images: records,
    };
    write_manifest(output_dir, &manifest)?;
    Ok(manifest)
}

/// Process images using a specific backend (allows testing with mock).
///
/// Returns one record per image, in the order of `images`. Nothing is written
/// when two images would share a tier file.
pub fn process_with_backend(
    backend: &impl ImageBackend,
    images: &[SourceImage],
    output_dir: &Path,
    config: &ProcessConfig,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<Vec<ImageRecord>, ProcessError> {
    check_output_collisions(images)?;
    tracing::info!("processing {} images", images.len());
    if let Some(tx) = &progress {
        tx.send(ProcessEvent::Started {
            image_count: images.len(),
        })
        .ok();
    }

    images
        .par_iter()
        .enumerate()
        .map(|(position, image)| {
            let (record, variants) = process_image(backend, image, output_dir, config)?;
            if let Some(tx) = &progress {
                tx.send(ProcessEvent::ImageProcessed {
                    index: position + 1,
                    label: record.label.clone(),
                    source_path: record.source_path.clone(),
                    variants,
                })
                .ok();
            }
            Ok(record)
        })
        .collect()
}

fn process_image(
    backend: &impl ImageBackend,
    image: &SourceImage,
    output_dir: &Path,
    config: &ProcessConfig,
) -> Result<(ImageRecord, Vec<VariantInfo>), ProcessError> {
    let frame = backend
        .decode(&image.absolute_path)
        .map_err(|source| ProcessError::Decode {
            path: image.absolute_path.clone(),
            source,
        })?;
    tracing::debug!(
        "decoded {} at {}x{}",
        image.key,
        frame.dimensions().0,
        frame.dimensions().1
    );

    let tier_path = tier_relative_path(&image.relative_path);
    let mut variants = Vec::new();
    let mut encode = |spec: &TierSpec| -> Result<TierOutput, ProcessError> {
        let output = output_dir.join(spec.tier.dir_name()).join(&tier_path);
        let (width, height) =
            encode_tier(backend, &frame, spec, &output).map_err(|source| ProcessError::Tier {
                path: image.absolute_path.clone(),
                tier: spec.tier,
                source,
            })?;
        variants.push(VariantInfo {
            label: format!("{} {}x{}", spec.tier, width, height),
            status: VariantStatus::Encoded,
        });
        Ok(TierOutput {
            path: output_url(spec.tier.dir_name(), &tier_path),
            width,
            height,
        })
    };
    let gallery = encode(&config.specs.gallery)?;
    let lightbox = encode(&config.specs.lightbox)?;

    let original = if config.include_originals {
        let dest = output_dir.join(ORIGINAL_DIR).join(&image.relative_path);
        copy_original(&image.absolute_path, &dest).map_err(|source| {
            ProcessError::Passthrough {
                path: image.absolute_path.clone(),
                source,
            }
        })?;
        variants.push(VariantInfo {
            label: ORIGINAL_DIR.to_string(),
            status: VariantStatus::Copied,
        });
        Some(output_url(ORIGINAL_DIR, &image.relative_path))
    } else {
        None
    };

    let record = ImageRecord {
        source_path: image.key.clone(),
        label: label_from_path(&image.relative_path),
        gallery,
        lightbox,
        original,
    };
    Ok((record, variants))
}

fn copy_original(source: &Path, dest: &Path) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, dest)?;
    Ok(())
}

/// Write `manifest.json` at the output root.
pub fn write_manifest(output_dir: &Path, manifest: &Manifest) -> Result<PathBuf, ProcessError> {
    let path = output_dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(&path, json)?;
    tracing::debug!("wrote {}", path.display());
    Ok(path)
}
