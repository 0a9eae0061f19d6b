//! Scratch extraction and re-archiving of a deck container.

use super::PatchError;
use crate::deck::write_atomically;
use crate::naming::natural_cmp;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::result::ZipError;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// One member of the source archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Name as stored in the archive.
    pub name: String,
    /// Location under the scratch root.
    pub relative: PathBuf,
    pub is_dir: bool,
    pub compression: CompressionMethod,
}

impl ArchiveEntry {
    /// Whether this is a slide part: `ppt/slides/slide<digits>.xml`.
    pub fn is_slide_part(&self) -> bool {
        !self.is_dir && is_slide_part(&self.name)
    }
}

pub fn is_slide_part(name: &str) -> bool {
    name.strip_prefix("ppt/slides/slide")
        .and_then(|rest| rest.strip_suffix(".xml"))
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// A container unpacked into a private temp directory.
///
/// The directory is removed when this value is dropped, whatever happened.
pub struct Scratch {
    dir: TempDir,
    entries: Vec<ArchiveEntry>,
}

impl Scratch {
    /// Unpack every member of `container`, remembering stored order.
    ///
    /// Any unreadable member aborts the whole extraction.
    pub fn extract(container: &Path) -> Result<Self, PatchError> {
        let read_err = |source: ZipError| PatchError::ArchiveRead {
            path: container.to_path_buf(),
            source,
        };

        let file = File::open(container).map_err(|source| PatchError::Open {
            path: container.to_path_buf(),
            source,
        })?;
        let mut archive = ZipArchive::new(file).map_err(read_err)?;
        let dir = tempfile::Builder::new()
            .prefix("photodeck-patch-")
            .tempdir()?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut member = archive.by_index(i).map_err(read_err)?;
            let name = member.name().to_string();
            let relative = member
                .enclosed_name()
                .ok_or_else(|| PatchError::UnsafeEntry {
                    path: container.to_path_buf(),
                    name: name.clone(),
                })?;
            let target = dir.path().join(&relative);

            if member.is_dir() {
                fs::create_dir_all(&target)?;
            } else {
                // Streamed: the declared size in the header is not trusted.
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                let mut out = File::create(&target)?;
                io::copy(&mut member, &mut out).map_err(|e| read_err(ZipError::Io(e)))?;
            }

            entries.push(ArchiveEntry {
                name,
                relative,
                is_dir: member.is_dir(),
                compression: member.compression(),
            });
        }

        log::debug!(
            "extracted {} entries from {} into {}",
            entries.len(),
            container.display(),
            dir.path().display()
        );
        Ok(Self { dir, entries })
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Slide parts, in natural name order (slide2 before slide10).
    pub fn slide_parts(&self) -> Vec<&ArchiveEntry> {
        let mut parts: Vec<&ArchiveEntry> =
            self.entries.iter().filter(|e| e.is_slide_part()).collect();
        parts.sort_by(|a, b| natural_cmp(&a.name, &b.name));
        parts
    }

    /// Path of `entry` on disk inside the scratch area.
    pub fn path_of(&self, entry: &ArchiveEntry) -> PathBuf {
        self.dir.path().join(&entry.relative)
    }

    /// Write every entry back out, in the original order, to `output`.
    ///
    /// Stored members stay stored; everything else is deflated.
    pub fn rearchive(&self, output: &Path) -> Result<(), PatchError> {
        write_atomically(output, |tmp| {
            let mut zip = ZipWriter::new(tmp.as_file_mut());
            for entry in &self.entries {
                let method = match entry.compression {
                    CompressionMethod::Stored => CompressionMethod::Stored,
                    _ => CompressionMethod::Deflated,
                };
                let options = SimpleFileOptions::default().compression_method(method);

                if entry.is_dir {
                    zip.add_directory(entry.name.as_str(), options)
                        .map_err(io::Error::other)?;
                    continue;
                }
                zip.start_file(entry.name.as_str(), options)
                    .map_err(io::Error::other)?;
                let mut source = File::open(self.path_of(entry))?;
                io::copy(&mut source, &mut zip)?;
            }
            zip.finish().map_err(io::Error::other)?;
            Ok(())
        })
        .map_err(|source| PatchError::ArchiveWrite {
            path: output.to_path_buf(),
            source,
        })
    }

    /// Remove the scratch directory, reporting (but not failing on) errors.
    pub fn cleanup(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            log::warn!("could not remove scratch dir {}: {e}", path.display());
        }
    }
}
