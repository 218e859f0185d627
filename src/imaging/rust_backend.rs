//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, WebP, BMP, TIFF) | `image` crate (pure Rust decoders) |
//! | Orientation | `kamadak-exif` tag read + `DynamicImage` flips/rotations |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e) |
//! | Identify AVIF output | `avif-parse` container metadata |

use super::backend::{BackendError, DecodedFrame, ImageBackend};
use super::orientation::Orientation;
use super::params::{EncodeParams, Quality, Speed};
use image::codecs::avif::AvifEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageFormat, ImageReader};
use std::borrow::Cow;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Source extensions the gallery accepts, with the decoder each needs.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("gif", ImageFormat::Gif),
    ("webp", ImageFormat::WebP),
    ("bmp", ImageFormat::Bmp),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the lowercase source extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode an in-memory source, trusting content sniffing over the extension.
fn decode_bytes(bytes: &[u8], path: &Path) -> Result<DynamicImage, BackendError> {
    let mut reader = ImageReader::new(Cursor::new(bytes));
    if let Ok(format) = ImageFormat::from_path(path) {
        reader.set_format(format);
    }
    let reader = reader.with_guessed_format().map_err(BackendError::Io)?;
    let format = reader.format();
    let image = reader
        .decode()
        .map_err(|e| BackendError::Decode(e.to_string()))?;
    Ok(match format {
        Some(ImageFormat::Gif) => drop_opaque_alpha(image),
        _ => image,
    })
}

/// Turn an RGBA frame whose alpha is fully opaque into RGB.
///
/// The GIF decoder always yields RGBA, even for palettes without a
/// transparent index; those frames carry no transparency information.
fn drop_opaque_alpha(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgba8(rgba) if rgba.pixels().all(|p| p.0[3] == u8::MAX) => {
            DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).to_rgb8())
        }
        other => other,
    }
}

/// Convert a frame to one of the two layouts the AVIF encoder accepts.
///
/// Anything carrying alpha (grayscale+alpha, RGBA at any depth) becomes 8-bit
/// RGBA. Everything else becomes 8-bit RGB. Palette sources are expanded by the
/// decoders: to RGBA with a transparency key, to RGB without one.
pub fn canonicalize(image: &DynamicImage) -> Result<Cow<'_, DynamicImage>, BackendError> {
    match image.color() {
        ColorType::Rgb8 | ColorType::Rgba8 => Ok(Cow::Borrowed(image)),
        ColorType::L8 | ColorType::L16 | ColorType::Rgb16 | ColorType::Rgb32F => {
            Ok(Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())))
        }
        ColorType::La8 | ColorType::La16 | ColorType::Rgba16 | ColorType::Rgba32F => {
            Ok(Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8())))
        }
        other => Err(BackendError::UnsupportedColorMode(format!("{other:?}"))),
    }
}

/// Encode to an in-memory AVIF so a failed encode never touches the disk.
fn encode_avif(
    image: &DynamicImage,
    quality: Quality,
    speed: Speed,
) -> Result<Vec<u8>, BackendError> {
    let mut buffer = Vec::new();
    let encoder =
        AvifEncoder::new_with_speed_quality(&mut buffer, speed.value(), quality.value());
    image
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::Encode(e.to_string()))?;
    Ok(buffer)
}

/// Sibling path used while a tier file is being written.
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

/// Write `bytes` to `path` via a temporary sibling and a rename.
///
/// Parent directories are created as needed. Readers only ever observe a
/// complete file at `path` or no file.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), BackendError> {
    let write_error = |source| BackendError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_error)?;
    }

    let tmp = partial_path(path);
    if let Err(e) = fs::write(&tmp, bytes).and_then(|()| fs::rename(&tmp, path)) {
        if let Err(cleanup) = fs::remove_file(&tmp) {
            tracing::debug!("could not remove {}: {cleanup}", tmp.display());
        }
        return Err(write_error(e));
    }
    Ok(())
}

/// Read the dimensions recorded in an AVIF file's container (no full decode).
pub fn read_avif_dimensions(path: &Path) -> Result<(u32, u32), BackendError> {
    let file_data = fs::read(path)?;
    let avif = avif_parse::read_avif(&mut Cursor::new(&file_data)).map_err(|e| {
        BackendError::Decode(format!("failed to parse AVIF {}: {e:?}", path.display()))
    })?;
    let meta = avif.primary_item_metadata().map_err(|e| {
        BackendError::Decode(format!(
            "failed to read AVIF metadata {}: {e:?}",
            path.display()
        ))
    })?;
    Ok((meta.max_frame_width.get(), meta.max_frame_height.get()))
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<DecodedFrame, BackendError> {
        // One read serves both the EXIF lookup and the pixel decode.
        let bytes = fs::read(path)?;
        let orientation = Orientation::from_encoded(&bytes);
        let image = decode_bytes(&bytes, path)?;
        tracing::debug!(
            "decoded {} ({}x{}, {:?}, {:?})",
            path.display(),
            image.width(),
            image.height(),
            image.color(),
            orientation
        );
        Ok(DecodedFrame::new(orientation.apply(image)))
    }

    fn encode(&self, frame: &DecodedFrame, params: &EncodeParams) -> Result<(), BackendError> {
        let resized;
        let source = if frame.dimensions() == (params.width, params.height) {
            frame.image()
        } else {
            resized = frame
                .image()
                .resize_exact(params.width, params.height, FilterType::Lanczos3);
            &resized
        };

        let canonical = canonicalize(source)?;
        let bytes = encode_avif(&canonical, params.quality, params.speed)?;
        write_atomically(&params.output, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        create_palette_png, create_test_gif, create_test_jpeg, create_test_png, write_bytes,
    };
    use image::{GrayAlphaImage, GrayImage, LumaA, Rgb32FImage, RgbImage, Rgba, RgbaImage};

    fn params(output: PathBuf, width: u32, height: u32) -> EncodeParams {
        EncodeParams {
            output,
            width,
            height,
            quality: Quality::new(30),
            speed: Speed::new(10),
        }
    }

    // =========================================================================
    // Extension set
    // =========================================================================

    #[test]
    fn supported_extensions_match_decodable_formats() {
        let exts = supported_input_extensions();
        for expected in &["jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff"] {
            assert!(
                exts.contains(expected),
                "expected {expected} in supported extensions"
            );
        }
        assert!(!exts.contains(&"avif"));
    }

    // =========================================================================
    // Mode canonicalization
    // =========================================================================

    #[test]
    fn canonicalize_keeps_rgb_and_rgba_borrowed() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
        assert!(matches!(canonicalize(&rgb).unwrap(), Cow::Borrowed(_)));

        let rgba = DynamicImage::ImageRgba8(RgbaImage::new(2, 2));
        assert!(matches!(canonicalize(&rgba).unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn canonicalize_grayscale_becomes_rgb() {
        let gray = DynamicImage::ImageLuma8(GrayImage::new(2, 2));
        assert_eq!(canonicalize(&gray).unwrap().color(), ColorType::Rgb8);
    }

    #[test]
    fn canonicalize_grayscale_alpha_becomes_rgba() {
        let gray_alpha =
            DynamicImage::ImageLumaA8(GrayAlphaImage::from_pixel(2, 2, LumaA([128, 10])));
        let out = canonicalize(&gray_alpha).unwrap();
        assert_eq!(out.color(), ColorType::Rgba8);
        assert_eq!(out.to_rgba8().get_pixel(0, 0), &Rgba([128, 128, 128, 10]));
    }

    #[test]
    fn canonicalize_high_depth_drops_to_8_bit() {
        let float = DynamicImage::ImageRgb32F(Rgb32FImage::new(2, 2));
        assert_eq!(canonicalize(&float).unwrap().color(), ColorType::Rgb8);

        let deep_alpha = DynamicImage::ImageRgba16(image::ImageBuffer::new(2, 2));
        assert_eq!(canonicalize(&deep_alpha).unwrap().color(), ColorType::Rgba8);
    }

    // =========================================================================
    // Decode
    // =========================================================================

    #[test]
    fn decode_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 200, 150);

        let frame = RustBackend::new().decode(&path).unwrap();
        assert_eq!(frame.dimensions(), (200, 150));
    }

    #[test]
    fn decode_applies_exif_rotation() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("rotated.jpg");
        write_bytes(
            &path,
            &crate::test_helpers::jpeg_bytes_with_orientation(40, 30, 6),
        );

        // Stored 40x30 landscape, displayed rotated 90° → 30x40
        let frame = RustBackend::new().decode(&path).unwrap();
        assert_eq!(frame.dimensions(), (30, 40));
    }

    #[test]
    fn decode_ignores_misleading_extension() {
        let tmp = tempfile::TempDir::new().unwrap();
        let png = tmp.path().join("real.png");
        create_test_png(&png, 20, 10, false);
        let lying = tmp.path().join("actually-png.jpg");
        fs::copy(&png, &lying).unwrap();

        let frame = RustBackend::new().decode(&lying).unwrap();
        assert_eq!(frame.dimensions(), (20, 10));
    }

    #[test]
    fn decode_corrupt_file_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.jpg");
        write_bytes(&path, b"\xFF\xD8\xFF definitely not a jpeg");

        let result = RustBackend::new().decode(&path);
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    // =========================================================================
    // Decoded colour types
    // =========================================================================

    fn decoded_canonical_color(path: &Path) -> ColorType {
        let frame = RustBackend::new().decode(path).unwrap();
        canonicalize(frame.image()).unwrap().color()
    }

    #[test]
    fn opaque_gif_decodes_to_rgb() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("flat.gif");
        create_test_gif(&path, 12, 8, false);

        let frame = RustBackend::new().decode(&path).unwrap();
        assert_eq!(frame.image().color(), ColorType::Rgb8);
        assert_eq!(decoded_canonical_color(&path), ColorType::Rgb8);
    }

    #[test]
    fn transparent_gif_keeps_alpha() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("cutout.gif");
        create_test_gif(&path, 12, 8, true);

        let frame = RustBackend::new().decode(&path).unwrap();
        assert_eq!(frame.image().color(), ColorType::Rgba8);
        assert_eq!(frame.image().to_rgba8().get_pixel(0, 0).0[3], 0);
        assert_eq!(decoded_canonical_color(&path), ColorType::Rgba8);
    }

    #[test]
    fn palette_png_with_transparency_key_is_rgba() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("indexed-trns.png");
        create_palette_png(&path, 8, 4, true);

        assert_eq!(decoded_canonical_color(&path), ColorType::Rgba8);
    }

    #[test]
    fn opaque_palette_png_is_rgb() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("indexed.png");
        create_palette_png(&path, 8, 4, false);

        assert_eq!(decoded_canonical_color(&path), ColorType::Rgb8);
    }

    #[test]
    fn only_fully_opaque_rgba_drops_alpha() {
        let opaque = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255])));
        assert_eq!(drop_opaque_alpha(opaque).color(), ColorType::Rgb8);

        let mut mixed = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]));
        mixed.put_pixel(1, 1, Rgba([1, 2, 3, 254]));
        let mixed = DynamicImage::ImageRgba8(mixed);
        assert_eq!(drop_opaque_alpha(mixed).color(), ColorType::Rgba8);
    }

    #[test]
    fn decode_nonexistent_file_is_io_error() {
        let result = RustBackend::new().decode(Path::new("/nonexistent/image.jpg"));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    // =========================================================================
    // Encode
    // =========================================================================

    #[test]
    fn encode_resizes_to_exact_dimensions() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 120, 80);

        let backend = RustBackend::new();
        let frame = backend.decode(&source).unwrap();
        let output = tmp.path().join("nested/dir/out.avif");
        backend
            .encode(&frame, &params(output.clone(), 60, 40))
            .unwrap();

        assert!(output.exists());
        assert_eq!(read_avif_dimensions(&output).unwrap(), (60, 40));
        assert!(!partial_path(&output).exists());
    }

    #[test]
    fn encode_passthrough_size_keeps_dimensions() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.png");
        create_test_png(&source, 40, 30, true);

        let backend = RustBackend::new();
        let frame = backend.decode(&source).unwrap();
        let output = tmp.path().join("out.avif");
        backend
            .encode(&frame, &params(output.clone(), 40, 30))
            .unwrap();

        assert_eq!(read_avif_dimensions(&output).unwrap(), (40, 30));
    }

    #[test]
    fn encode_into_unwritable_location_is_write_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        // A regular file where a directory is needed
        let blocker = tmp.path().join("blocker");
        write_bytes(&blocker, b"");
        let output = blocker.join("out.avif");

        let frame = DecodedFrame::new(DynamicImage::ImageRgb8(RgbImage::new(8, 8)));
        let result = RustBackend::new().encode(&frame, &params(output.clone(), 8, 8));

        assert!(matches!(result, Err(BackendError::Write { path, .. }) if path == output));
    }

    #[test]
    fn partial_path_is_a_sibling() {
        let p = partial_path(Path::new("/out/gallery/a.avif"));
        assert_eq!(p, Path::new("/out/gallery/a.avif.partial"));
    }

    #[test]
    fn read_avif_dimensions_rejects_non_avif() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("fake.avif");
        write_bytes(&path, b"nope");
        assert!(read_avif_dimensions(&path).is_err());
    }
}
