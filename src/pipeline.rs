//! End-to-end deck build: collect → normalize → compose → write → patch.
//!
//! Decoding, rotation and slide rendering are independent per image and run
//! on the rayon pool. Results are collected back in collection order and
//! appended to the [`Document`] on the calling thread, so slide order never
//! depends on scheduling.
//!
//! An image that fails to read, decode or render is skipped with a warning
//! and listed in the [`BuildReport`]; it never stops the run. Failures that
//! affect the whole deck (missing input, unwritable output, corrupt
//! container during patching) are returned as [`PipelineError`].

use crate::collect::{CollectError, TraversalPolicy, collect};
use crate::compose::{Composer, PlacementPolicy, write_deck};
use crate::deck::{DeckError, PptxWriter};
use crate::imaging::{ImageBackend, Quality, RustBackend, load_and_normalize};
use crate::patch::{PatchError, PatchReport, TransitionSpec, add_transitions};
use crate::types::{Document, ImageEntry, Rgb, Slide, SlideGeometry};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Collect(#[from] CollectError),
    #[error(transparent)]
    Deck(#[from] DeckError),
    #[error(transparent)]
    Patch(#[from] PatchError),
}

/// Everything a build needs, resolved from config and CLI.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub input_dir: PathBuf,
    pub output: PathBuf,
    pub traversal: TraversalPolicy,
    pub geometry: SlideGeometry,
    pub placement: PlacementPolicy,
    pub fill: Rgb,
    pub quality: Quality,
    pub transitions: Option<TransitionOptions>,
}

/// Optional second pass producing a copy of the deck with transitions.
#[derive(Debug, Clone)]
pub struct TransitionOptions {
    pub spec: TransitionSpec,
    pub output: PathBuf,
}

/// Progress events emitted during a build.
#[derive(Debug, Clone)]
pub enum BuildEvent {
    /// Collection finished.
    Collected { total: usize },
    /// A slide was appended. `index` is 1-based.
    SlideAdded {
        index: usize,
        total: usize,
        source: String,
    },
    /// An image was left out of the deck.
    AssetSkipped { source: String, reason: String },
    /// The deck file was written.
    DeckWritten { path: PathBuf, slides: usize },
}

/// An image that did not make it into the deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedAsset {
    pub source: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub deck: PathBuf,
    /// Images found by the collector.
    pub collected: usize,
    pub slides: Vec<String>,
    pub skipped: Vec<SkippedAsset>,
    pub transitions: Option<PatchReport>,
}

pub fn build(
    options: &BuildOptions,
    events: Option<Sender<BuildEvent>>,
) -> Result<BuildReport, PipelineError> {
    build_with_backend(&RustBackend::new(), options, events)
}

/// Build using a specific backend (allows testing with mock).
pub fn build_with_backend(
    backend: &impl ImageBackend,
    options: &BuildOptions,
    events: Option<Sender<BuildEvent>>,
) -> Result<BuildReport, PipelineError> {
    let emit = |event: BuildEvent| {
        if let Some(tx) = &events {
            // receiver gone just means nobody is listening
            let _ = tx.send(event);
        }
    };

    let entries = collect(&options.input_dir, options.traversal)?;
    let total = entries.len();
    emit(BuildEvent::Collected { total });
    if entries.is_empty() {
        log::warn!(
            "no images found under {}; writing an empty deck",
            options.input_dir.display()
        );
    }

    let composer = Composer::new(backend, options.placement, options.fill, options.quality);
    let rendered: Vec<Result<Slide, SkippedAsset>> = entries
        .par_iter()
        .map(|entry| render_entry(&composer, options.geometry, entry))
        .collect();

    let mut document = Document::new(options.geometry);
    let mut skipped = Vec::new();
    for result in rendered {
        match result {
            Ok(slide) => {
                let source = slide.source.clone();
                document.push(slide);
                emit(BuildEvent::SlideAdded {
                    index: document.len(),
                    total,
                    source,
                });
            }
            Err(skip) => {
                log::warn!("skipping {}: {}", skip.source, skip.reason);
                emit(BuildEvent::AssetSkipped {
                    source: skip.source.clone(),
                    reason: skip.reason.clone(),
                });
                skipped.push(skip);
            }
        }
    }

    let mut writer = PptxWriter::new(options.geometry);
    write_deck(&mut writer, &document, &options.output)?;
    emit(BuildEvent::DeckWritten {
        path: options.output.clone(),
        slides: document.len(),
    });

    let transitions = match &options.transitions {
        Some(t) => Some(add_transitions(&options.output, &t.output, &t.spec)?),
        None => None,
    };

    Ok(BuildReport {
        deck: options.output.clone(),
        collected: total,
        slides: document.slides().iter().map(|s| s.source.clone()).collect(),
        skipped,
        transitions,
    })
}

fn render_entry<B: ImageBackend>(
    composer: &Composer<'_, B>,
    geometry: SlideGeometry,
    entry: &ImageEntry,
) -> Result<Slide, SkippedAsset> {
    let skip = |reason: String| SkippedAsset {
        source: entry.relative.clone(),
        reason,
    };
    let image =
        load_and_normalize(composer.backend(), entry).map_err(|e| skip(e.cause.to_string()))?;
    composer
        .render(geometry, &image)
        .map_err(|e| skip(e.to_string()))
}
