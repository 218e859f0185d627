//! Shared test utilities: synthetic source images written on the fly.
//!
//! Fixtures are generated in code rather than checked in, so every test gets
//! exactly the dimensions and metadata it asserts on.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! create_test_jpeg(&tmp.path().join("a.jpg"), 200, 150);
//! write_bytes(&tmp.path().join("b.jpg"), &jpeg_bytes_with_orientation(40, 30, 6));
//! create_palette_png(&tmp.path().join("c.png"), 8, 8, true);
//! ```

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
    })
}

/// Write a gradient JPEG of the given size.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, ImageFormat::Jpeg)
        .unwrap();
}

/// Write a PNG of the given size, optionally with a translucent alpha channel.
pub fn create_test_png(path: &Path, width: u32, height: u32, alpha: bool) {
    if alpha {
        RgbaImage::from_fn(width, height, |x, _| Rgba([200, 100, 50, (x % 256) as u8]))
            .save_with_format(path, ImageFormat::Png)
            .unwrap();
    } else {
        gradient(width, height)
            .save_with_format(path, ImageFormat::Png)
            .unwrap();
    }
}

/// Write a GIF of the given size, optionally with fully transparent pixels in
/// the left column.
pub fn create_test_gif(path: &Path, width: u32, height: u32, transparent: bool) {
    let base = gradient(width, height);
    let frame = RgbaImage::from_fn(width, height, |x, y| {
        let Rgb([r, g, b]) = *base.get_pixel(x, y);
        let alpha = if transparent && x == 0 { 0 } else { u8::MAX };
        Rgba([r, g, b, alpha])
    });
    frame.save_with_format(path, ImageFormat::Gif).unwrap();
}

/// Write an 8-bit indexed PNG with a four-entry palette.
///
/// With `transparent`, a `tRNS` chunk makes palette entry 0 fully transparent.
pub fn create_palette_png(path: &Path, width: u32, height: u32, transparent: bool) {
    let file = std::fs::File::create(path).unwrap();
    let mut encoder = png::Encoder::new(std::io::BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(vec![
        0, 0, 0, //
        255, 0, 0, //
        0, 255, 0, //
        0, 0, 255,
    ]);
    if transparent {
        encoder.set_trns(vec![0, 255, 255, 255]);
    }
    let indices: Vec<u8> = (0..width * height).map(|i| (i % 4) as u8).collect();
    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(&indices).unwrap();
}

/// Write raw bytes, creating parent directories.
pub fn write_bytes(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, bytes).unwrap();
}

/// Encode a `width`×`height` JPEG carrying an EXIF Orientation tag.
///
/// The pixels are stored as-is; `orientation` only tells viewers how to
/// display them.
pub fn jpeg_bytes_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    let mut jpeg = Vec::new();
    DynamicImage::ImageRgb8(gradient(width, height))
        .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
        .unwrap();

    // Big-endian TIFF header + one IFD with a single SHORT entry (0x0112)
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\x00\x2A");
    tiff.extend_from_slice(&8u32.to_be_bytes());
    tiff.extend_from_slice(&1u16.to_be_bytes());
    tiff.extend_from_slice(&0x0112u16.to_be_bytes());
    tiff.extend_from_slice(&3u16.to_be_bytes());
    tiff.extend_from_slice(&1u32.to_be_bytes());
    tiff.extend_from_slice(&orientation.to_be_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_be_bytes());

    let mut app1 = vec![0xFF, 0xE1];
    let length = (2 + 6 + tiff.len()) as u16;
    app1.extend_from_slice(&length.to_be_bytes());
    app1.extend_from_slice(b"Exif\x00\x00");
    app1.extend_from_slice(&tiff);

    // Splice right after SOI
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    out
}

#[test]
fn orientation_jpeg_has_exif_segment_after_soi() {
    let bytes = jpeg_bytes_with_orientation(8, 6, 3);
    assert_eq!(&bytes[..4], &[0xFF, 0xD8, 0xFF, 0xE1]);
    assert_eq!(u16::from_be_bytes([bytes[4], bytes[5]]), 34);
    assert_eq!(&bytes[6..12], b"Exif\x00\x00");
}
