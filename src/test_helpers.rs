//! Shared test utilities for the photodeck test suite.
//!
//! Builds input trees and synthetic image files in temp directories, and
//! reads generated decks back for assertions.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_images(tmp.path(), &[("A/1.jpg", 64, 48), ("B/1.png", 32, 32)]);
//! touch_tree(tmp.path(), &["notes.txt"]);
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

// =========================================================================
// Input trees
// =========================================================================

/// Create each `/`-separated path under `root` with placeholder content.
pub fn touch_tree(root: &Path, files: &[&str]) {
    for file in files {
        let path = root.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"placeholder").unwrap();
    }
}

/// Write real, decodable images. Format follows the extension.
pub fn write_images(root: &Path, images: &[(&str, u32, u32)]) {
    for &(name, w, h) in images {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let bytes = match path.extension().and_then(|e| e.to_str()) {
            Some("png") => png_bytes(w, h),
            _ => jpeg_bytes(w, h),
        };
        fs::write(&path, bytes).unwrap();
    }
}

// =========================================================================
// Synthetic images
// =========================================================================

/// A gradient so encoders have something to chew on.
pub fn gradient(w: u32, h: u32) -> RgbImage {
    RgbImage::from_fn(w, h, |x, y| {
        image::Rgb([(x * 255 / w.max(1)) as u8, (y * 255 / h.max(1)) as u8, 128])
    })
}

pub fn jpeg_bytes(w: u32, h: u32) -> Vec<u8> {
    let mut out = Vec::new();
    gradient(w, h)
        .write_with_encoder(JpegEncoder::new_with_quality(&mut out, 85))
        .unwrap();
    out
}

pub fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    gradient(w, h).write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Splice a minimal EXIF APP1 segment carrying `orientation` into a JPEG.
///
/// Layout: `Exif\0\0`, little-endian TIFF header, IFD0 with one SHORT entry
/// for tag 0x0112, no next IFD.
pub fn with_exif_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG");

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II*\0");
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x0112u16.to_le_bytes());
    tiff.extend_from_slice(&3u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&orientation.to_le_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_le_bytes());

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&tiff);
    let segment_len = (payload.len() + 2) as u16;

    let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
    out.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

// =========================================================================
// Reading decks back
// =========================================================================

/// Names of all entries in a zip container, in stored order.
pub fn zip_entry_names(path: &Path) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Contents of one zip entry.
pub fn zip_entry(path: &Path, name: &str) -> Vec<u8> {
    let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut out = Vec::new();
    file.read_to_end(&mut out).unwrap();
    out
}

/// Contents of one zip entry as UTF-8 text.
pub fn zip_entry_text(path: &Path, name: &str) -> String {
    String::from_utf8(zip_entry(path, name)).unwrap()
}
