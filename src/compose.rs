//! Slide composition.
//!
//! Stage 3 of the photodeck pipeline. Takes an upright [`CanonicalImage`] and
//! decides how it sits on a slide, then hands finished slides to a
//! [`DeckWriter`].
//!
//! ## Placement policies
//!
//! | Policy | Picture | Position |
//! |---|---|---|
//! | `letterbox` (default) | fitted inside the slide, pasted centered on a solid canvas | full slide |
//! | `fit-width` | scaled to slide width, height follows aspect | vertically centered, may overflow |
//! | `raw` | unscaled, 96 DPI | top-left corner |
//!
//! Letterbox bakes the bars into the picture so every viewer shows the same
//! frame. The canvas color doubles as the slide background.

use crate::deck::{DeckError, DeckWriter, PictureSource};
use crate::imaging::{
    BackendError, CanonicalImage, ImageBackend, MAX_ENCODED_SIDE, Quality, center_offset,
    fit_width, fit_within,
};
use crate::types::{Document, Placement, Rgb, Slide, SlideGeometry, px_to_emu};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// How a picture is scaled and positioned on its slide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementPolicy {
    /// Fit inside the slide, centered on a solid canvas.
    #[default]
    Letterbox,
    /// Full slide width, vertically centered.
    FitWidth,
    /// Native size at the top-left corner.
    Raw,
}

/// Renders canonical images into slides.
pub struct Composer<'a, B: ImageBackend> {
    backend: &'a B,
    policy: PlacementPolicy,
    fill: Rgb,
    quality: Quality,
}

impl<'a, B: ImageBackend> Composer<'a, B> {
    pub fn new(backend: &'a B, policy: PlacementPolicy, fill: Rgb, quality: Quality) -> Self {
        Self {
            backend,
            policy,
            fill,
            quality,
        }
    }

    pub fn backend(&self) -> &'a B {
        self.backend
    }

    /// Render one image into a slide for a deck of the given geometry.
    ///
    /// Pure with respect to any document; safe to call from worker threads.
    pub fn render(
        &self,
        geometry: SlideGeometry,
        image: &CanonicalImage,
    ) -> Result<Slide, BackendError> {
        let (slide_w, slide_h) = geometry.pixel_size();

        let (pixels, placement) = match self.policy {
            PlacementPolicy::Letterbox => {
                let (w, h) = fit_within(image.dimensions(), (slide_w, slide_h));
                let fitted = self.backend.resize(&image.pixels, w, h);
                let mut canvas = RgbImage::from_pixel(slide_w, slide_h, image::Rgb(self.fill.0));
                image::imageops::overlay(
                    &mut canvas,
                    &fitted,
                    center_offset(slide_w, w),
                    center_offset(slide_h, h),
                );
                (canvas, Placement::full_bleed(geometry, Some(self.fill)))
            }
            PlacementPolicy::FitWidth => {
                let (w, h) = fit_width(image.dimensions(), slide_w);
                ensure_encodable(w, h)?;
                let scaled = self.backend.resize(&image.pixels, w, h);
                let placement = Placement {
                    left: 0,
                    top: px_to_emu(center_offset(slide_h, h)),
                    width: geometry.width,
                    height: px_to_emu(h as i64),
                    fill: None,
                };
                (scaled, placement)
            }
            PlacementPolicy::Raw => {
                let (w, h) = image.dimensions();
                ensure_encodable(w, h)?;
                let placement = Placement {
                    left: 0,
                    top: 0,
                    width: px_to_emu(w as i64),
                    height: px_to_emu(h as i64),
                    fill: None,
                };
                (image.pixels.clone(), placement)
            }
        };

        let picture = self.backend.encode(&pixels, self.quality)?;
        Ok(Slide {
            source: image.source.clone(),
            placement,
            picture,
            picture_size: pixels.dimensions(),
        })
    }

    /// Render one image and append it to `document`.
    pub fn compose<'d>(
        &self,
        document: &'d mut Document,
        image: &CanonicalImage,
    ) -> Result<&'d Slide, BackendError> {
        let slide = self.render(document.geometry(), image)?;
        Ok(document.push(slide))
    }
}

/// Reject sizes the encoder cannot write before any pixels are allocated.
fn ensure_encodable(width: u32, height: u32) -> Result<(), BackendError> {
    if width > MAX_ENCODED_SIDE || height > MAX_ENCODED_SIDE {
        return Err(BackendError::TooLarge { width, height });
    }
    Ok(())
}

/// Hand every slide of `document` to `writer`, in order, and save to `path`.
///
/// Pictures go in as in-memory bytes when the writer takes them. Otherwise
/// each one is spilled to a temp file that lives only for that call.
pub fn write_deck<W: DeckWriter>(
    writer: &mut W,
    document: &Document,
    path: &Path,
) -> Result<(), DeckError> {
    let streams = writer.accepts_streams();

    for slide in document.slides() {
        let index = writer.add_blank_slide();
        if streams {
            writer.add_picture(index, PictureSource::Bytes(&slide.picture), &slide.placement)?;
        } else {
            let mut spill = tempfile::Builder::new()
                .prefix("photodeck-slide-")
                .suffix(".jpg")
                .tempfile()?;
            spill.write_all(&slide.picture)?;
            spill.flush()?;
            writer.add_picture(index, PictureSource::File(spill.path()), &slide.placement)?;
        }
    }

    writer.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::tests::{MockWriter, WriterCall};
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::{Orientation, RustBackend};
    use tempfile::TempDir;

    fn canonical(w: u32, h: u32) -> CanonicalImage {
        CanonicalImage {
            source: "a.jpg".to_string(),
            orientation: Orientation::NORMAL,
            original_size: (w, h),
            pixels: RgbImage::new(w, h),
        }
    }

    fn composer(backend: &MockBackend, policy: PlacementPolicy) -> Composer<'_, MockBackend> {
        Composer::new(backend, policy, Rgb::BLACK, Quality::default())
    }

    // =========================================================================
    // render
    // =========================================================================

    #[test]
    fn letterbox_covers_the_whole_slide() {
        let backend = MockBackend::new();
        let slide = composer(&backend, PlacementPolicy::Letterbox)
            .render(SlideGeometry::STANDARD, &canonical(1920, 1080))
            .unwrap();

        assert_eq!(
            slide.placement,
            Placement::full_bleed(SlideGeometry::STANDARD, Some(Rgb::BLACK))
        );
        assert_eq!(slide.picture_size, (960, 720));
        assert_eq!(
            backend.get_operations(),
            vec![
                RecordedOp::Resize {
                    width: 960,
                    height: 540
                },
                RecordedOp::Encode {
                    width: 960,
                    height: 720,
                    quality: 90
                },
            ]
        );
    }

    #[test]
    fn letterbox_pastes_picture_centered_on_fill() {
        let backend = RustBackend::new();
        let mut image = canonical(200, 100);
        image.pixels = RgbImage::from_pixel(200, 100, image::Rgb([255, 255, 255]));

        let composer = Composer::new(
            &backend,
            PlacementPolicy::Letterbox,
            Rgb::BLACK,
            Quality::new(100),
        );
        let slide = composer.render(SlideGeometry::STANDARD, &image).unwrap();

        let decoded = image::load_from_memory(&slide.picture).unwrap().into_rgb8();
        assert_eq!(decoded.dimensions(), (960, 720));
        // 960x480 band centered vertically, 120px bars above and below
        let bar = decoded.get_pixel(480, 10).0;
        let center = decoded.get_pixel(480, 360).0;
        assert!(bar.iter().all(|&c| c < 40), "bar {bar:?}");
        assert!(center.iter().all(|&c| c > 215), "center {center:?}");
    }

    #[test]
    fn fit_width_portrait_starts_above_the_slide() {
        let backend = MockBackend::new();
        let slide = composer(&backend, PlacementPolicy::FitWidth)
            .render(SlideGeometry::STANDARD, &canonical(3000, 4000))
            .unwrap();

        assert_eq!(slide.placement.left, 0);
        assert_eq!(slide.placement.width, SlideGeometry::STANDARD.width);
        assert_eq!(slide.placement.height, px_to_emu(1280));
        assert_eq!(slide.placement.top, px_to_emu(-280));
        assert_eq!(slide.placement.fill, None);
    }

    #[test]
    fn fit_width_landscape_is_centered_vertically() {
        let backend = MockBackend::new();
        let slide = composer(&backend, PlacementPolicy::FitWidth)
            .render(SlideGeometry::STANDARD, &canonical(1920, 1080))
            .unwrap();

        assert_eq!(slide.placement.top, px_to_emu(90));
        assert_eq!(slide.placement.height, px_to_emu(540));
    }

    #[test]
    fn fit_width_rejects_strips_too_tall_to_encode() {
        let backend = MockBackend::new();
        let result = composer(&backend, PlacementPolicy::FitWidth)
            .render(SlideGeometry::STANDARD, &canonical(2, 20_000));

        assert!(matches!(
            result,
            Err(BackendError::TooLarge {
                width: 960,
                height: 9_600_000
            })
        ));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn letterbox_handles_the_same_strip() {
        let backend = MockBackend::new();
        let slide = composer(&backend, PlacementPolicy::Letterbox)
            .render(SlideGeometry::STANDARD, &canonical(2, 20_000))
            .unwrap();
        assert_eq!(slide.picture_size, (960, 720));
    }

    #[test]
    fn raw_keeps_native_size_at_origin() {
        let backend = MockBackend::new();
        let slide = composer(&backend, PlacementPolicy::Raw)
            .render(SlideGeometry::STANDARD, &canonical(300, 200))
            .unwrap();

        assert_eq!((slide.placement.left, slide.placement.top), (0, 0));
        assert_eq!(slide.placement.width, 300 * 9525);
        assert_eq!(slide.placement.height, 200 * 9525);
        assert!(
            !backend
                .get_operations()
                .iter()
                .any(|op| matches!(op, RecordedOp::Resize { .. }))
        );
    }

    #[test]
    fn compose_appends_to_document() {
        let backend = MockBackend::new();
        let composer = composer(&backend, PlacementPolicy::Letterbox);
        let mut doc = Document::new(SlideGeometry::WIDESCREEN);

        let slide = composer.compose(&mut doc, &canonical(100, 100)).unwrap();
        assert_eq!(slide.picture_size, (1280, 720));
        composer.compose(&mut doc, &canonical(50, 80)).unwrap();
        assert_eq!(doc.len(), 2);
    }

    // =========================================================================
    // write_deck
    // =========================================================================

    fn two_slide_document() -> Document {
        let backend = MockBackend::new();
        let composer = composer(&backend, PlacementPolicy::Letterbox);
        let mut doc = Document::new(SlideGeometry::STANDARD);
        for (w, h) in [(100, 100), (200, 100)] {
            composer.compose(&mut doc, &canonical(w, h)).unwrap();
        }
        doc
    }

    #[test]
    fn write_deck_streams_bytes_when_supported() {
        let tmp = TempDir::new().unwrap();
        let mut writer = MockWriter::new(true);

        write_deck(&mut writer, &two_slide_document(), &tmp.path().join("d.pptx")).unwrap();

        assert_eq!(
            writer.calls,
            vec![
                WriterCall::AddSlide,
                WriterCall::AddPicture { slide: 0, from_file: false, len: 4 },
                WriterCall::AddSlide,
                WriterCall::AddPicture { slide: 1, from_file: false, len: 4 },
                WriterCall::Save,
            ]
        );
    }

    #[test]
    fn write_deck_spills_to_temp_files_otherwise() {
        let tmp = TempDir::new().unwrap();
        let mut writer = MockWriter::new(false);

        write_deck(&mut writer, &two_slide_document(), &tmp.path().join("d.pptx")).unwrap();

        let from_file: Vec<bool> = writer
            .calls
            .iter()
            .filter_map(|c| match c {
                WriterCall::AddPicture { from_file, len, .. } => {
                    assert_eq!(*len, 4);
                    Some(*from_file)
                }
                _ => None,
            })
            .collect();
        assert_eq!(from_file, vec![true, true]);
        // spill files are gone once the picture is embedded
        for path in &writer.spilled {
            assert!(!path.exists(), "{} left behind", path.display());
        }
    }
}
