//! Pure Rust image codec backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, BMP, GIF) | `image::load_from_memory` |
//! | Orientation tag | `kamadak-exif` (`exif::Reader::read_from_container`) |
//! | Rotate | `image::imageops::rotate90` / `rotate180` / `rotate270` |
//! | Resize | `image::imageops::resize` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//!
//! GIF input decodes to its first frame.

use super::backend::{BackendError, Decoded, ImageBackend};
use super::params::{Orientation, Quality, Rotation};
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use std::io::Cursor;

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

/// Read the EXIF orientation tag from raw file bytes.
///
/// Files without EXIF (most PNG, all BMP/GIF) and files whose EXIF block
/// does not parse are treated as upright.
pub fn read_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    let exif = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(_) => return Orientation::NORMAL,
    };

    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .map(Orientation::from_tag)
        .unwrap_or_default()
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8]) -> Result<Decoded, BackendError> {
        let pixels =
            image::load_from_memory(bytes).map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(Decoded {
            pixels,
            orientation: read_orientation(bytes),
        })
    }

    fn rotate(&self, image: RgbImage, rotation: Rotation) -> RgbImage {
        // imageops rotates clockwise
        match rotation {
            Rotation::Ccw90 => imageops::rotate270(&image),
            Rotation::Ccw180 => imageops::rotate180(&image),
            Rotation::Ccw270 => imageops::rotate90(&image),
        }
    }

    fn resize(&self, image: &RgbImage, width: u32, height: u32) -> RgbImage {
        if image.dimensions() == (width, height) {
            return image.clone();
        }
        imageops::resize(image, width, height, FilterType::Lanczos3)
    }

    fn encode(&self, image: &RgbImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, quality.value() as u8);
        image
            .write_with_encoder(encoder)
            .map_err(|e| BackendError::Encode(e.to_string()))?;
        Ok(out)
    }
}
