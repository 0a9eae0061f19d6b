//! PowerPoint (`.pptx`) writer.
//!
//! Keeps slides and media in memory and writes the whole package in one go
//! on [`save`](DeckWriter::save). XML parts are deflated; media entries are
//! stored as-is since they are already compressed.

use super::parts::{self, PictureRef};
use super::{DeckError, DeckWriter, PictureSource, write_atomically};
use crate::types::{Placement, Rgb, SlideGeometry};
use image::ImageFormat;
use std::fs;
use std::io::{self, Seek, Write};
use std::path::Path;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const DEFAULT_TITLE: &str = "Photos Presentation";

struct Media {
    name: String,
    bytes: Vec<u8>,
}

struct EmbeddedPicture {
    media: usize,
    placement: Placement,
}

#[derive(Default)]
struct SlideParts {
    background: Option<Rgb>,
    pictures: Vec<EmbeddedPicture>,
}

/// In-memory presentation with fixed slide geometry.
pub struct PptxWriter {
    geometry: SlideGeometry,
    title: String,
    slides: Vec<SlideParts>,
    media: Vec<Media>,
}

impl PptxWriter {
    /// Empty deck with the given slide size.
    pub fn new(geometry: SlideGeometry) -> Self {
        Self {
            geometry,
            title: DEFAULT_TITLE.to_string(),
            slides: Vec::new(),
            media: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    fn add_media(&mut self, bytes: Vec<u8>) -> Result<usize, DeckError> {
        let ext = match image::guess_format(&bytes) {
            Ok(ImageFormat::Jpeg) => "jpeg",
            Ok(ImageFormat::Png) => "png",
            Ok(ImageFormat::Gif) => "gif",
            Ok(ImageFormat::Bmp) => "bmp",
            _ => return Err(DeckError::UnsupportedPicture),
        };
        let index = self.media.len();
        self.media.push(Media {
            name: format!("image{}.{ext}", index + 1),
            bytes,
        });
        Ok(index)
    }

    fn write_package<W: Write + Seek>(&self, out: W) -> io::Result<()> {
        let xml = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let mut zip = ZipWriter::new(out);

        let count = self.slides.len();
        let fixed = [
            (parts::CONTENT_TYPES, parts::content_types(count)),
            (parts::ROOT_RELS, parts::root_rels()),
            (parts::APP, parts::app(count)),
            (parts::CORE, parts::core(&self.title)),
            (parts::PRESENTATION, parts::presentation(self.geometry, count)),
            (parts::PRESENTATION_RELS, parts::presentation_rels(count)),
            (parts::MASTER, parts::master()),
            (parts::MASTER_RELS, parts::master_rels()),
            (parts::LAYOUT, parts::layout()),
            (parts::LAYOUT_RELS, parts::layout_rels()),
            (parts::THEME, parts::theme()),
        ];
        for (name, body) in &fixed {
            put(&mut zip, name, body.as_bytes(), xml)?;
        }

        for (i, slide) in self.slides.iter().enumerate() {
            let number = i + 1;
            let refs: Vec<PictureRef<'_>> = slide
                .pictures
                .iter()
                .enumerate()
                .map(|(j, p)| PictureRef {
                    rel_id: parts::picture_rel_id(j),
                    placement: &p.placement,
                })
                .collect();
            let media: Vec<String> = slide
                .pictures
                .iter()
                .map(|p| self.media[p.media].name.clone())
                .collect();

            put(
                &mut zip,
                &parts::slide_name(number),
                parts::slide(number, slide.background, &refs).as_bytes(),
                xml,
            )?;
            put(
                &mut zip,
                &parts::slide_rels_name(number),
                parts::slide_rels(&media).as_bytes(),
                xml,
            )?;
        }

        for media in &self.media {
            put(
                &mut zip,
                &format!("ppt/media/{}", media.name),
                &media.bytes,
                stored,
            )?;
        }

        zip.finish().map_err(io::Error::other)?;
        Ok(())
    }
}

fn put<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    bytes: &[u8],
    options: SimpleFileOptions,
) -> io::Result<()> {
    zip.start_file(name, options).map_err(io::Error::other)?;
    zip.write_all(bytes)
}

impl DeckWriter for PptxWriter {
    fn accepts_streams(&self) -> bool {
        true
    }

    fn add_blank_slide(&mut self) -> usize {
        self.slides.push(SlideParts::default());
        self.slides.len() - 1
    }

    fn add_picture(
        &mut self,
        slide: usize,
        picture: PictureSource<'_>,
        placement: &Placement,
    ) -> Result<(), DeckError> {
        if slide >= self.slides.len() {
            return Err(DeckError::NoSuchSlide(slide));
        }
        let bytes = match picture {
            PictureSource::Bytes(bytes) => bytes.to_vec(),
            PictureSource::File(path) => fs::read(path)?,
        };
        let media = self.add_media(bytes)?;

        let parts = &mut self.slides[slide];
        if placement.fill.is_some() {
            parts.background = placement.fill;
        }
        parts.pictures.push(EmbeddedPicture {
            media,
            placement: *placement,
        });
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<(), DeckError> {
        write_atomically(path, |tmp| self.write_package(tmp.as_file_mut())).map_err(|source| {
            DeckError::Write {
                path: path.to_path_buf(),
                source,
            }
        })?;
        log::debug!(
            "wrote {} ({} slides, {} media)",
            path.display(),
            self.slides.len(),
            self.media.len()
        );
        Ok(())
    }
}
