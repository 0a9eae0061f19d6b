//! Ordered image discovery.
//!
//! Stage 1 of the photodeck pipeline. Walks the input directory tree, keeps
//! files whose extension is one of `png`, `jpg`, `jpeg`, `bmp`, `gif`
//! (case-insensitive), and returns them in a deterministic order.
//!
//! ## Ordering
//!
//! Every comparison uses [`NaturalKey`], so `img2.jpg` precedes `img10.jpg`.
//! Two traversal policies decide how folders interact:
//!
//! - [`TraversalPolicy::Flatten`]: one global sort keyed by
//!   (parent folder path, file name). Folder paths are compared as whole
//!   strings, so sibling folders with a shared prefix can interleave their
//!   nested subfolders.
//! - [`TraversalPolicy::PerFolder`]: files directly in the root come first,
//!   then each top-level subfolder in natural order, with everything beneath
//!   that folder sorted on its own before moving to the next.
//!
//! ```text
//! root/                    flatten            per-folder
//! ├── A/x.jpg              A/x.jpg            A/x.jpg
//! ├── A/sub/z.jpg          A B/y.jpg          A/sub/z.jpg
//! └── A B/y.jpg            A/sub/z.jpg        A B/y.jpg
//! ```
//!
//! A run uses exactly one policy; the choice comes from config or the CLI.
//! Nothing is read from the files here; that happens per image in the
//! normalizer.

use crate::naming::NaturalKey;
use crate::types::ImageEntry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("Input directory not found: {0}")]
    RootNotFound(PathBuf),
    #[error("Failed to walk input directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Recognized image extensions (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// How nested folders are ordered relative to each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalPolicy {
    /// One global sort over (folder path, file name).
    #[default]
    Flatten,
    /// Root files first, then one top-level folder at a time.
    PerFolder,
}

/// Sort key for one discovered file.
///
/// `group` is only set under [`TraversalPolicy::PerFolder`]; `None` sorts
/// before `Some`, which puts root-level files first.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OrderKey {
    group: Option<NaturalKey>,
    folder: NaturalKey,
    file: NaturalKey,
}

impl OrderKey {
    fn new(relative: &str, policy: TraversalPolicy) -> Self {
        let (parent, file) = match relative.rsplit_once('/') {
            Some((parent, file)) => (parent, file),
            None => ("", relative),
        };

        match policy {
            TraversalPolicy::Flatten => Self {
                group: None,
                folder: NaturalKey::new(parent),
                file: NaturalKey::new(file),
            },
            TraversalPolicy::PerFolder => {
                let (group, rest) = if parent.is_empty() {
                    (None, "")
                } else {
                    match parent.split_once('/') {
                        Some((top, rest)) => (Some(top), rest),
                        None => (Some(parent), ""),
                    }
                };
                Self {
                    group: group.map(NaturalKey::new),
                    folder: NaturalKey::new(rest),
                    file: NaturalKey::new(file),
                }
            }
        }
    }
}

/// Collect every image under `root`, ordered by `policy`.
///
/// An input tree with no matching files yields an empty list, not an error.
pub fn collect(root: &Path, policy: TraversalPolicy) -> Result<Vec<ImageEntry>, CollectError> {
    if !root.is_dir() {
        return Err(CollectError::RootNotFound(root.to_path_buf()));
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_image(entry.path()) {
            continue;
        }
        let relative = relative_id(root, entry.path());
        entries.push(ImageEntry {
            path: entry.into_path(),
            relative,
        });
    }

    entries.sort_by_cached_key(|e| OrderKey::new(&e.relative, policy));
    log::debug!(
        "collected {} images under {} ({:?})",
        entries.len(),
        root.display(),
        policy
    );
    Ok(entries)
}

/// Whether `path` has one of the [`IMAGE_EXTENSIONS`].
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// `/`-separated path of `path` relative to `root`.
fn relative_id(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
