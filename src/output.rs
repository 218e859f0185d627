//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every image is shown by its positional index and label; the source path is
//! secondary context on an indented `Source:` line. The listing reads as an
//! inventory of the gallery while staying traceable to files.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Images (3 photos)
//! 001 beach
//!     Source: beach.JPG
//! 002 IMG 0042
//!     Source: trips/2019/IMG_0042.jpeg
//! 003 negative 01
//!     Source: scans/negative-01.tiff
//! ```
//!
//! ## Build
//!
//! ```text
//! Processing 3 photos
//!     002 IMG 0042
//!         Source: trips/2019/IMG_0042.jpeg
//!         gallery 640x480: encoded
//!         lightbox 3000x2250: encoded
//!         original: copied
//!
//! Built 3 photos → site/manifest.json
//! ```
//!
//! # Architecture
//!
//! Each listing has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure and do no I/O.

use crate::naming::label_from_path;
use crate::process::{ProcessEvent, VariantStatus};
use crate::scan::SourceImage;
use crate::types::Manifest;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an image line: index + label.
///
/// ```text
/// 001 my sunset photo
/// ```
fn image_line(index: usize, label: &str) -> String {
    format!("{} {}", format_index(index), label)
}

fn photo_count(n: usize) -> String {
    match n {
        1 => "1 photo".to_string(),
        n => format!("{} photos", n),
    }
}

// ============================================================================
// Scan output
// ============================================================================

/// Format the discovered image set in enumeration order.
pub fn format_scan_output(images: &[SourceImage]) -> Vec<String> {
    let mut lines = vec![format!("Images ({})", photo_count(images.len()))];
    for (idx, image) in images.iter().enumerate() {
        lines.push(image_line(idx + 1, &label_from_path(&image.relative_path)));
        lines.push(format!("{}Source: {}", indent(1), image.key));
    }
    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(images: &[SourceImage]) {
    for line in format_scan_output(images) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format a single process progress event as display lines.
///
/// Each image leads with its final position and label. Source path and
/// per-variant status are shown as indented context.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Started { image_count } => {
            vec![format!("Processing {}", photo_count(*image_count))]
        }
        ProcessEvent::ImageProcessed {
            index,
            label,
            source_path,
            variants,
        } => {
            let mut lines = vec![
                format!("{}{}", indent(1), image_line(*index, label)),
                format!("{}Source: {}", indent(2), source_path),
            ];
            for variant in variants {
                let status_str = match variant.status {
                    VariantStatus::Copied => "copied",
                    VariantStatus::Encoded => "encoded",
                };
                lines.push(format!("{}{}: {}", indent(2), variant.label, status_str));
            }
            lines
        }
    }
}

/// Print a process event to stdout.
pub fn print_process_event(event: &ProcessEvent) {
    for line in format_process_event(event) {
        println!("{}", line);
    }
}

/// Format the closing summary of a successful build.
pub fn format_build_summary(manifest: &Manifest, manifest_path: &Path) -> Vec<String> {
    let originals = manifest
        .images
        .iter()
        .filter(|r| r.original.is_some())
        .count();
    let mut summary = format!(
        "Built {} \u{2192} {}",
        photo_count(manifest.images.len()),
        manifest_path.display()
    );
    if originals > 0 {
        summary.push_str(&format!(" ({} originals copied)", originals));
    }
    vec![String::new(), summary]
}

/// Print the build summary to stdout.
pub fn print_build_summary(manifest: &Manifest, manifest_path: &Path) {
    for line in format_build_summary(manifest, manifest_path) {
        println!("{}", line);
    }
}
