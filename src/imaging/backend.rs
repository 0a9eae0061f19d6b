//! Image codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four operations the rest of the
//! pipeline needs from a codec: decode (pixels plus orientation tag), rotate,
//! resize, and lossy encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend): pure Rust, built on the
//! `image` crate. Tests use a recording mock so normalizer and composer logic
//! can be checked without real pixel work.

use super::params::{Orientation, Quality, Rotation};
use image::{DynamicImage, RgbImage};
use thiserror::Error;

/// Largest width or height a baseline JPEG can record.
pub const MAX_ENCODED_SIDE: u32 = 65_535;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Picture would be {width}x{height} px, over the {MAX_ENCODED_SIDE} px encoder limit")]
    TooLarge { width: u32, height: u32 },
}

/// Result of decoding an image file.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub pixels: DynamicImage,
    /// Orientation tag from embedded metadata, [`Orientation::NORMAL`] if absent.
    pub orientation: Orientation,
}

/// Trait for image codec backends.
///
/// `Sync` so a single backend can be shared across rayon workers.
pub trait ImageBackend: Sync {
    /// Decode raw file bytes and read the orientation tag.
    fn decode(&self, bytes: &[u8]) -> Result<Decoded, BackendError>;

    /// Rotate, expanding the canvas.
    fn rotate(&self, image: RgbImage, rotation: Rotation) -> RgbImage;

    /// Resample to exactly `width` × `height`.
    fn resize(&self, image: &RgbImage, width: u32, height: u32) -> RgbImage;

    /// Encode to a lossy format (JPEG).
    fn encode(&self, image: &RgbImage, quality: Quality) -> Result<Vec<u8>, BackendError>;
}
