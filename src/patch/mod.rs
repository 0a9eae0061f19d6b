//! Post-processing: add slide transitions to an existing deck.
//!
//! Decks are zip containers of XML parts. Patching never touches the source
//! file and never writes a partial output:
//!
//! 1. Extract every member into a private scratch directory.
//! 2. Rewrite each slide part (`ppt/slides/slideN.xml`) in parallel, one
//!    worker per part. A part that cannot be patched is skipped and
//!    reported; the rest still get their transition.
//! 3. Re-archive every member, in the original order, into a temp file next
//!    to the output and rename it into place.
//! 4. Remove the scratch directory.
//!
//! Container-level failures (unreadable archive, unsafe member names, write
//! errors) abort the whole operation before any output exists.

mod archive;
mod transition;

pub use archive::is_slide_part;
pub use transition::{PRESENTATION_NS, inject_transition};

use archive::Scratch;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("Cannot open deck {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("Corrupt or unreadable deck {path}: {source}")]
    ArchiveRead {
        path: PathBuf,
        source: zip::result::ZipError,
    },
    #[error("Deck {path} has a member that escapes the archive root: {name}")]
    UnsafeEntry { path: PathBuf, name: String },
    #[error("Failed to write patched deck {path}: {source}")]
    ArchiveWrite { path: PathBuf, source: io::Error },
    #[error("Scratch directory error: {0}")]
    Scratch(#[from] io::Error),
    #[error("Output would overwrite the source deck: {0}")]
    SameFile(PathBuf),
}

/// Why a single slide part was left unpatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartSkipReason {
    /// The part's root is not a PresentationML `sld` element.
    MissingSlideElement,
    /// The part is not well-formed XML.
    Malformed(String),
}

impl std::fmt::Display for PartSkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartSkipReason::MissingSlideElement => write!(f, "no slide root element"),
            PartSkipReason::Malformed(msg) => write!(f, "malformed XML: {msg}"),
        }
    }
}

/// Transition effect. Each maps to the PresentationML element of the same name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    #[default]
    Fade,
    Push,
    Wipe,
    Cut,
    Dissolve,
    Random,
}

impl TransitionKind {
    pub fn element(self) -> &'static str {
        match self {
            TransitionKind::Fade => "fade",
            TransitionKind::Push => "push",
            TransitionKind::Wipe => "wipe",
            TransitionKind::Cut => "cut",
            TransitionKind::Dissolve => "dissolve",
            TransitionKind::Random => "random",
        }
    }
}

/// Speed of the transition effect itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransitionSpeed {
    #[default]
    Slow,
    Med,
    Fast,
}

impl TransitionSpeed {
    pub fn as_str(self) -> &'static str {
        match self {
            TransitionSpeed::Slow => "slow",
            TransitionSpeed::Med => "med",
            TransitionSpeed::Fast => "fast",
        }
    }
}

/// What to add to every slide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionSpec {
    pub kind: TransitionKind,
    /// Seconds each slide stays up before auto-advancing.
    pub duration_secs: f64,
    pub speed: TransitionSpeed,
}

impl TransitionSpec {
    pub const DEFAULT_DURATION_SECS: f64 = 4.0;

    /// Auto-advance delay in whole milliseconds.
    pub fn advance_after_ms(&self) -> u64 {
        if self.duration_secs.is_finite() && self.duration_secs > 0.0 {
            (self.duration_secs * 1000.0).round() as u64
        } else {
            0
        }
    }
}

impl Default for TransitionSpec {
    fn default() -> Self {
        Self {
            kind: TransitionKind::default(),
            duration_secs: Self::DEFAULT_DURATION_SECS,
            speed: TransitionSpeed::default(),
        }
    }
}

/// Outcome of a patch run.
#[derive(Debug, Clone)]
pub struct PatchReport {
    pub output: PathBuf,
    /// Slide parts that received a transition, in slide order.
    pub patched: Vec<String>,
    /// Slide parts left as they were, with the reason.
    pub skipped: Vec<(String, PartSkipReason)>,
    /// Total members copied into the output.
    pub entries: usize,
}

/// Default name for the patched copy of `deck`: `<stem>_with_transitions.pptx`
/// next to it.
pub fn default_output(deck: &Path) -> PathBuf {
    let stem = deck
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "deck".to_string());
    deck.with_file_name(format!("{stem}_with_transitions.pptx"))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Write a copy of `container` to `output` with `spec` applied to every slide.
///
/// `container` is only read. `output` appears complete or not at all.
pub fn add_transitions(
    container: &Path,
    output: &Path,
    spec: &TransitionSpec,
) -> Result<PatchReport, PatchError> {
    if same_file(container, output) {
        return Err(PatchError::SameFile(output.to_path_buf()));
    }

    let scratch = Scratch::extract(container)?;
    let parts = scratch.slide_parts();

    let outcomes = parts
        .par_iter()
        .map(|entry| -> Result<(String, Option<PartSkipReason>), PatchError> {
            let path = scratch.path_of(entry);
            let xml = fs::read(&path)?;
            match inject_transition(&xml, spec) {
                Ok(patched) => {
                    fs::write(&path, patched)?;
                    Ok((entry.name.clone(), None))
                }
                Err(reason) => {
                    log::warn!("{}: skipped ({reason})", entry.name);
                    Ok((entry.name.clone(), Some(reason)))
                }
            }
        })
        .collect::<Result<Vec<_>, PatchError>>()?;

    scratch.rearchive(output)?;
    let entries = scratch.entries().len();
    scratch.cleanup();

    let mut report = PatchReport {
        output: output.to_path_buf(),
        patched: Vec::new(),
        skipped: Vec::new(),
        entries,
    };
    for (name, skipped) in outcomes {
        match skipped {
            None => report.patched.push(name),
            Some(reason) => report.skipped.push((name, reason)),
        }
    }

    log::info!(
        "added transitions to {} of {} slides → {}",
        report.patched.len(),
        report.patched.len() + report.skipped.len(),
        output.display()
    );
    Ok(report)
}
