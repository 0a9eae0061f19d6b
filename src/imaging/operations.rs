//! Orientation normalization.
//!
//! Turns raw file bytes into upright RGB pixels. This is the only place the
//! orientation tag is interpreted; everything downstream sees canonical
//! pixels with no metadata attached.

use super::backend::{BackendError, ImageBackend};
use super::params::Orientation;
use crate::types::{ImageAsset, ImageEntry};
use image::RgbImage;
use thiserror::Error;

/// A decoded image: upright, 3-channel RGB.
#[derive(Debug, Clone)]
pub struct CanonicalImage {
    /// Identifier of the source file (relative path).
    pub source: String,
    /// Orientation tag found in the file.
    pub orientation: Orientation,
    /// Pixel size as stored in the file, before any rotation.
    pub original_size: (u32, u32),
    pub pixels: RgbImage,
}

impl CanonicalImage {
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

/// A single image could not be read or decoded. Never fatal for a run.
#[derive(Error, Debug)]
#[error("{asset}: {cause}")]
pub struct NormalizationError {
    pub asset: String,
    #[source]
    pub cause: BackendError,
}

/// Decode an asset, rotate it upright and convert it to RGB.
///
/// Tags 3, 6 and 8 are corrected with a canvas-expanding rotation. Mirrored
/// tags are logged and passed through untransformed.
pub fn normalize(
    backend: &impl ImageBackend,
    asset: &ImageAsset,
) -> Result<CanonicalImage, NormalizationError> {
    let decoded = backend
        .decode(&asset.bytes)
        .map_err(|cause| NormalizationError {
            asset: asset.source.clone(),
            cause,
        })?;

    let original_size = (decoded.pixels.width(), decoded.pixels.height());
    let orientation = decoded.orientation;
    let mut pixels = decoded.pixels.into_rgb8();

    match orientation.correction() {
        Some(rotation) => {
            log::debug!(
                "{}: orientation {} → rotating {}°",
                asset.source,
                orientation.tag(),
                rotation.degrees()
            );
            pixels = backend.rotate(pixels, rotation);
        }
        None if orientation.is_mirrored() => {
            log::debug!(
                "{}: mirrored orientation {} left as stored",
                asset.source,
                orientation.tag()
            );
        }
        None => {}
    }

    Ok(CanonicalImage {
        source: asset.source.clone(),
        orientation,
        original_size,
        pixels,
    })
}

/// Read an entry from disk and [`normalize`] it.
pub fn load_and_normalize(
    backend: &impl ImageBackend,
    entry: &ImageEntry,
) -> Result<CanonicalImage, NormalizationError> {
    let asset = ImageAsset::read(entry).map_err(|e| NormalizationError {
        asset: entry.relative.clone(),
        cause: BackendError::Io(e),
    })?;
    normalize(backend, &asset)
}
