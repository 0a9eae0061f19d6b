//! Image processing: pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory` |
//! | **Orientation tag** | `kamadak-exif` |
//! | **Rotate / resize** | `image::imageops` (Lanczos3) |
//! | **Encode → JPEG** | `image::codecs::jpeg` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for placement math (unit testable)
//! - **Parameters**: Quality, orientation tag, rotation
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: The orientation normalizer

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Decoded, ImageBackend, MAX_ENCODED_SIDE};
pub use calculations::{center_offset, fit_width, fit_within};
pub use operations::{CanonicalImage, NormalizationError, load_and_normalize, normalize};
pub use params::{Orientation, Quality, Rotation};
pub use rust_backend::RustBackend;
