//! Image processing in pure Rust, with no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image` decoders (JPEG, PNG, GIF, WebP, BMP, TIFF) |
//! | **Orientation** | `kamadak-exif` tag → flips/rotations |
//! | **Resize → AVIF** | Lanczos3 + rav1e encoder |
//! | **Identify output** | `avif-parse` container metadata |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for tier dimension math (unit testable)
//! - **Parameters**: Tier policies and encode parameters
//! - **Orientation**: EXIF orientation lookup and pixel transforms
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
pub mod orientation;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, DecodedFrame, ImageBackend};
pub use calculations::{scale_to_height, scale_to_max_dimension};
pub use operations::encode_tier;
pub use orientation::Orientation;
pub use params::{EncodeParams, Quality, SizingRule, Speed, Tier, TierSpec, TierSpecs};
pub use rust_backend::{RustBackend, read_avif_dimensions, supported_input_extensions};
