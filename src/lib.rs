//! # Justified Gal
//!
//! Turns a directory tree of photos into the assets of a justified-grid web
//! gallery: two AVIF renditions per photo plus one ordered metadata file that a
//! page renderer consumes.
//!
//! # Pipeline
//!
//! ```text
//! 1. Scan      photos/   →  sorted SourceImage list       (walkdir, extension filter)
//! 2. Select    list      →  shuffled and/or truncated list (--shuffle, --dev --limit)
//! 3. Process   list      →  gallery/ + lightbox/ AVIF     (decode once, encode twice)
//! 4. Hand off  records   →  manifest.json                 (page settings + ImageRecords)
//! ```
//!
//! Every photo is decoded exactly once. Its EXIF orientation is applied to the
//! pixels, and both tiers are scaled from that single upright frame:
//!
//! - **gallery**: height capped at `round(target_row_height × height_scale)`
//!   (480 px by default), for the justified grid.
//! - **lightbox**: longer edge capped at 3000 px, for the full view.
//!
//! Neither tier is ever upscaled, and the two sizes are computed independently
//! from the same source dimensions.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the input directory and returns supported images in a stable order |
//! | [`process`] | Orchestrates selection, per-image decode/encode, output bootstrap and the manifest |
//! | [`imaging`] | Pure-Rust decode, orientation, resize and AVIF encode behind the [`imaging::ImageBackend`] trait |
//! | [`config`] | `config.toml` loading over stock defaults, validation, run mode |
//! | [`naming`] | Labels and output paths derived from a source's relative path |
//! | [`types`] | Records serialized for the external renderer |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## All-or-Nothing Runs
//!
//! The first image that fails to decode, encode or copy aborts the run, and no
//! `manifest.json` is written. A renderer never sees a record list that
//! disagrees with the files on disk.
//!
//! ## Parallel, Order-Preserving
//!
//! Images are independent, so they are processed on a rayon pool. Results are
//! collected by position, so the record order equals the selection order no
//! matter which image finishes first.
//!
//! ## No Partial Files
//!
//! Tier files are encoded in memory and moved into place with a rename. A
//! failed encode or write leaves no half-written `.avif` behind.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling (Lanczos3) and AVIF encoding (rav1e) all come from the
//! `image` crate. The binary has no system library dependencies.

pub mod config;
pub mod imaging;
pub mod logging;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
