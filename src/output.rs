//! CLI output formatting for the build, list and patch commands.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Build progress
//!
//! ```text
//! Found 3 images
//! 001/003 A/1.jpg
//! 002/003 A/2.png
//!     skipped A/3.jpg: decode error: unexpected EOF
//! Saved Photos_Presentation.pptx (2 slides)
//! ```
//!
//! ## Summary
//!
//! ```text
//! Processed 2 of 3 images, skipped 1
//!     A/3.jpg: decode error: unexpected EOF
//! Deck: Photos_Presentation.pptx
//! Transitions: 2 slides patched, 0 skipped → Photos_Presentation_with_transitions.pptx
//! ```

use crate::patch::PatchReport;
use crate::pipeline::{BuildEvent, BuildReport};
use crate::types::ImageEntry;
use std::error::Error;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format a single build progress event as display lines.
pub fn format_build_event(event: &BuildEvent) -> Vec<String> {
    match event {
        BuildEvent::Collected { total } => vec![format!("Found {}", plural(*total, "image"))],
        BuildEvent::SlideAdded {
            index,
            total,
            source,
        } => vec![format!(
            "{}/{} {}",
            format_index(*index),
            format_index(*total),
            source
        )],
        BuildEvent::AssetSkipped { source, reason } => {
            vec![format!("    skipped {source}: {reason}")]
        }
        BuildEvent::DeckWritten { path, slides } => vec![format!(
            "Saved {} ({})",
            path.display(),
            plural(*slides, "slide")
        )],
    }
}

/// Format the end-of-run summary.
pub fn format_build_summary(report: &BuildReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Processed {} of {}, skipped {}",
        report.slides.len(),
        plural(report.collected, "image"),
        report.skipped.len()
    )];
    for skip in &report.skipped {
        lines.push(format!("    {}: {}", skip.source, skip.reason));
    }
    lines.push(format!("Deck: {}", report.deck.display()));
    if let Some(patch) = &report.transitions {
        lines.extend(format_patch_report(patch));
    }
    lines
}

pub fn print_build_summary(report: &BuildReport) {
    for line in format_build_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Transitions
// ============================================================================

/// Format the outcome of a transition pass.
pub fn format_patch_report(report: &PatchReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Transitions: {} patched, {} skipped → {}",
        plural(report.patched.len(), "slide"),
        report.skipped.len(),
        report.output.display()
    )];
    for (part, reason) in &report.skipped {
        lines.push(format!("    {part}: {reason}"));
    }
    lines
}

pub fn print_patch_report(report: &PatchReport) {
    for line in format_patch_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// List
// ============================================================================

/// Format the ordered image list, one numbered line per image.
pub fn format_image_list(entries: &[ImageEntry]) -> Vec<String> {
    let mut lines: Vec<String> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{} {}", format_index(i + 1), entry.relative))
        .collect();
    lines.push(format!("{} total", plural(entries.len(), "image")));
    lines
}

pub fn print_image_list(entries: &[ImageEntry]) {
    for line in format_image_list(entries) {
        println!("{}", line);
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Format an error and each of its sources, outermost first.
///
/// A cause whose text already appears in the message above it is not
/// repeated.
pub fn format_error_chain(err: &dyn Error) -> Vec<String> {
    let mut shown = err.to_string();
    let mut lines = vec![format!("error: {shown}")];
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !shown.contains(&text) {
            lines.push(format!("    caused by: {text}"));
        }
        shown = text;
        source = cause.source();
    }
    lines
}

pub fn print_error_chain(err: &dyn Error) {
    for line in format_error_chain(err) {
        eprintln!("{}", line);
    }
}
