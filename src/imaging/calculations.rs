//! Pure calculation functions for tier dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! Both sizing rules share the same conventions:
//! - never upscale: an image already within the constraint is returned unchanged
//! - scaled edges are rounded to the nearest integer, halves away from zero
//!   (`f64::round`), and floored at 1
//! - the aspect ratio is preserved to within one rounding unit

/// Scale an edge by a factor, rounding to nearest and never collapsing to zero.
fn scale_edge(edge: u32, scale: f64) -> u32 {
    ((edge as f64 * scale).round() as u32).max(1)
}

/// Cap an image's height at `target_height`, preserving aspect ratio.
///
/// # Examples
/// ```
/// # use justified_gal::imaging::scale_to_height;
/// // 4000x3000 capped at 480px tall → 640x480
/// assert_eq!(scale_to_height((4000, 3000), 480), (640, 480));
///
/// // Already short enough: unchanged, never upscaled
/// assert_eq!(scale_to_height((200, 150), 480), (200, 150));
/// ```
pub fn scale_to_height(original: (u32, u32), target_height: u32) -> (u32, u32) {
    let (width, height) = original;
    if height <= target_height {
        return original;
    }

    let scale = target_height as f64 / height as f64;
    (scale_edge(width, scale), target_height.max(1))
}

/// Cap the longer edge of an image at `max_dimension`, preserving aspect ratio.
///
/// # Examples
/// ```
/// # use justified_gal::imaging::scale_to_max_dimension;
/// // Landscape: width is the longer edge
/// assert_eq!(scale_to_max_dimension((4000, 3000), 3000), (3000, 2250));
///
/// // Portrait: height is the longer edge
/// assert_eq!(scale_to_max_dimension((3000, 4000), 3000), (2250, 3000));
/// ```
pub fn scale_to_max_dimension(original: (u32, u32), max_dimension: u32) -> (u32, u32) {
    let (width, height) = original;
    let largest = width.max(height);
    if largest <= max_dimension {
        return original;
    }

    let scale = max_dimension as f64 / largest as f64;
    (scale_edge(width, scale), scale_edge(height, scale))
}
