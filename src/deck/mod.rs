//! Slide-deck authoring.
//!
//! [`DeckWriter`] is the seam between composition and a concrete file
//! format. The only production implementation is [`PptxWriter`], which
//! writes an Office Open XML presentation package directly with `zip`.
//!
//! Saving is atomic: the package is assembled in a temp file next to the
//! target and renamed into place only once complete, so an interrupted run
//! never leaves a half-written deck behind.

mod parts;
mod pptx;

pub use pptx::PptxWriter;

use crate::types::Placement;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Slide {0} does not exist")]
    NoSuchSlide(usize),
    #[error("Unsupported picture format (expected JPEG, PNG, GIF or BMP)")]
    UnsupportedPicture,
    #[error("Failed to write deck {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Picture data handed to [`DeckWriter::add_picture`].
#[derive(Debug, Clone, Copy)]
pub enum PictureSource<'a> {
    Bytes(&'a [u8]),
    File(&'a Path),
}

/// A slide-deck authoring backend.
///
/// Created empty with fixed geometry; slides are only ever appended.
pub trait DeckWriter {
    /// Whether [`PictureSource::Bytes`] is accepted. When false, callers
    /// must pass pictures as files.
    fn accepts_streams(&self) -> bool;

    /// Append an empty slide and return its zero-based index.
    fn add_blank_slide(&mut self) -> usize;

    /// Place a picture on an existing slide.
    fn add_picture(
        &mut self,
        slide: usize,
        picture: PictureSource<'_>,
        placement: &Placement,
    ) -> Result<(), DeckError>;

    /// Serialize the deck to `path`.
    fn save(&mut self, path: &Path) -> Result<(), DeckError>;
}

/// Directory a sibling temp file for `path` should live in.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Write `path` through a temp file in the same directory, renamed into
/// place only when `write` succeeds. On error the temp file is removed and
/// `path` is untouched.
pub(crate) fn write_atomically<T>(
    path: &Path,
    write: impl FnOnce(&mut NamedTempFile) -> io::Result<T>,
) -> io::Result<T> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".photodeck-")
        .suffix(".part")
        .tempfile_in(parent_dir(path))?;
    let value = write(&mut tmp)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(value)
}
