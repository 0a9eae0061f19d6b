//! Shared data model passed between pipeline stages.
//!
//! ```text
//! ImageEntry  (collect)  →  ImageAsset  (read once)  →  CanonicalImage (normalize)
//!                                                     →  Slide          (compose)
//!                                                     →  Document       (ordered slides)
//! ```
//!
//! Geometry is stored in EMU (English Metric Units, 914 400 per inch), the
//! unit the slide-deck format uses. Pixel sizes are derived through a fixed
//! 96 px/inch assumption, so one pixel is exactly 9 525 EMU.

use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// EMU per inch.
pub const EMU_PER_INCH: i64 = 914_400;
/// Pixels per inch assumed when converting slide geometry to pixels.
pub const DPI: i64 = 96;
/// EMU per pixel at [`DPI`].
pub const EMU_PER_PIXEL: i64 = EMU_PER_INCH / DPI;

/// Convert an EMU length to whole pixels (truncating).
pub fn emu_to_px(emu: i64) -> i64 {
    emu * DPI / EMU_PER_INCH
}

/// Convert whole pixels to EMU.
pub fn px_to_emu(px: i64) -> i64 {
    px * EMU_PER_PIXEL
}

/// A discovered image file, before anything is read from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageEntry {
    /// Absolute (or root-joined) path used for reading.
    #[serde(skip)]
    pub path: PathBuf,
    /// Path relative to the collection root, `/`-separated. Used as the
    /// asset identifier in logs, errors and summaries.
    pub relative: String,
}

/// An image file read into memory. Lives until its slide is rendered.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub source: String,
    pub bytes: Vec<u8>,
}

impl ImageAsset {
    pub fn read(entry: &ImageEntry) -> std::io::Result<Self> {
        Ok(Self {
            source: entry.relative.clone(),
            bytes: fs::read(&entry.path)?,
        })
    }
}

/// Slide dimensions in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlideGeometry {
    pub width: i64,
    pub height: i64,
}

impl SlideGeometry {
    /// Default 10in × 7.5in (4:3) deck.
    pub const STANDARD: SlideGeometry = SlideGeometry {
        width: 9_144_000,
        height: 6_858_000,
    };

    /// 13.333in × 7.5in (16:9) deck.
    pub const WIDESCREEN: SlideGeometry = SlideGeometry {
        width: 12_192_000,
        height: 6_858_000,
    };

    /// Slide size in whole pixels at 96 DPI.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            emu_to_px(self.width).max(1) as u32,
            emu_to_px(self.height).max(1) as u32,
        )
    }
}

impl Default for SlideGeometry {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);

    /// Parse `#rrggbb` (leading `#` optional).
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb([channel(0)?, channel(2)?, channel(4)?]))
    }

    /// Uppercase `RRGGBB`, the form OOXML `srgbClr` expects.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.0;
        format!("{r:02X}{g:02X}{b:02X}")
    }
}

/// Where a picture sits on its slide, in EMU.
///
/// Offsets are signed: a fit-width picture taller than the slide starts
/// above the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
    /// Solid slide background behind the picture, if any.
    pub fill: Option<Rgb>,
}

impl Placement {
    /// Picture covering the whole slide.
    pub fn full_bleed(geometry: SlideGeometry, fill: Option<Rgb>) -> Self {
        Self {
            left: 0,
            top: 0,
            width: geometry.width,
            height: geometry.height,
            fill,
        }
    }
}

/// One slide: a single encoded picture plus where it goes.
#[derive(Debug, Clone)]
pub struct Slide {
    /// Identifier of the source image (relative path).
    pub source: String,
    pub placement: Placement,
    /// Encoded picture bytes (JPEG).
    pub picture: Vec<u8>,
    /// Pixel size of the encoded picture.
    pub picture_size: (u32, u32),
}

/// Ordered slides plus deck geometry. Only ever grows by appending.
#[derive(Debug, Clone, Default)]
pub struct Document {
    geometry: SlideGeometry,
    slides: Vec<Slide>,
}

impl Document {
    pub fn new(geometry: SlideGeometry) -> Self {
        Self {
            geometry,
            slides: Vec::new(),
        }
    }

    pub fn geometry(&self) -> SlideGeometry {
        self.geometry
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Append a slide and return a reference to it.
    pub fn push(&mut self, slide: Slide) -> &Slide {
        self.slides.push(slide);
        &self.slides[self.slides.len() - 1]
    }
}
