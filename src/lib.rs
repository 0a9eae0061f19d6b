//! # Photodeck
//!
//! Turns a directory tree of photos into a slide deck, one picture per slide.
//! The filesystem is the data source: every recognized image becomes a slide,
//! in natural order, upright according to its EXIF orientation.
//!
//! # Architecture: Collect, Compose, Patch
//!
//! ```text
//! 1. Collect   photos/   →  ordered image list   (filesystem → ImageEntry list)
//! 2. Compose   images    →  deck.pptx            (decode, rotate, place, save)
//! 3. Patch     deck.pptx →  deck_with_transitions.pptx   (optional)
//! ```
//!
//! Stage 2 decodes and renders images in parallel on a rayon pool, then
//! appends slides in collection order. Stage 3 never touches the deck it
//! reads: it unpacks a copy into a scratch directory, rewrites each slide
//! part's XML and re-archives everything into a new file.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`collect`] | Walks the input directory and orders image files naturally |
//! | [`naming`] | Natural-sort key (`img2` before `img10`) |
//! | [`imaging`] | Image backend trait, EXIF orientation, placement math, normalization |
//! | [`compose`] | Placement policies and slide rendering |
//! | [`deck`] | `DeckWriter` trait and the zip-based PPTX writer |
//! | [`patch`] | Transition injection into an existing deck |
//! | [`pipeline`] | End-to-end build with progress events |
//! | [`config`] | `photodeck.toml` loading, merging and validation |
//! | [`types`] | Shared data model: entries, geometry, slides, document |
//! | [`output`] | CLI output formatting |
//!
//! # Units
//!
//! Everything placed on a slide is measured in EMU (English Metric Units,
//! 914400 per inch). Pixels convert at a fixed 96 DPI, so one pixel is
//! 9525 EMU and the standard 10in × 7.5in slide is 960 × 720 pixels.
//!
//! # Atomic Output
//!
//! Both the deck and its patched copy are written to a temp file beside the
//! target and renamed into place only once complete. A failed run leaves
//! either the previous file or nothing, never a truncated archive.

pub mod collect;
pub mod compose;
pub mod config;
pub mod deck;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod patch;
pub mod pipeline;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
