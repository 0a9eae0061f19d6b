//! Parameter types for image operations.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`Orientation`]: EXIF orientation tag (0x0112) as stored in the file.
//! - [`Rotation`]: A canvas-expanding rotation, in counter-clockwise degrees.

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Counter-clockwise rotation applied to correct an orientation tag.
///
/// Rotations by 90° and 270° swap width and height; the canvas always grows
/// to fit, nothing is cropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Ccw90,
    Ccw180,
    Ccw270,
}

impl Rotation {
    pub fn degrees(self) -> u32 {
        match self {
            Rotation::Ccw90 => 90,
            Rotation::Ccw180 => 180,
            Rotation::Ccw270 => 270,
        }
    }

    /// Output dimensions for an input of `(width, height)`.
    pub fn rotated_size(self, (width, height): (u32, u32)) -> (u32, u32) {
        match self {
            Rotation::Ccw180 => (width, height),
            Rotation::Ccw90 | Rotation::Ccw270 => (height, width),
        }
    }
}

/// EXIF orientation tag value.
///
/// Valid tags are 1–8. Only the pure rotations are acted on:
///
/// | Tag | Meaning | Correction |
/// |---|---|---|
/// | 1 | upright | none |
/// | 3 | upside down | 180° |
/// | 6 | rotated 90° clockwise | 270° counter-clockwise |
/// | 8 | rotated 90° counter-clockwise | 90° counter-clockwise |
///
/// Mirrored variants (2, 4, 5, 7) are left untransformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orientation(pub u16);

impl Orientation {
    pub const NORMAL: Orientation = Orientation(1);

    /// Build from a raw tag value. Anything outside 1–8 is treated as upright.
    pub fn from_tag(tag: u32) -> Self {
        match tag {
            1..=8 => Orientation(tag as u16),
            _ => Self::NORMAL,
        }
    }

    pub fn tag(self) -> u16 {
        self.0
    }

    /// Rotation that makes the image upright, if this tag calls for one.
    pub fn correction(self) -> Option<Rotation> {
        match self.0 {
            3 => Some(Rotation::Ccw180),
            6 => Some(Rotation::Ccw270),
            8 => Some(Rotation::Ccw90),
            _ => None,
        }
    }

    /// Whether this is one of the mirrored tags (2, 4, 5, 7).
    pub fn is_mirrored(self) -> bool {
        matches!(self.0, 2 | 4 | 5 | 7)
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::NORMAL
    }
}
