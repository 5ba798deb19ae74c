// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — build a single-page PDF holding one JPEG raster using the
// `lopdf` crate.
//
// The JPEG is embedded unchanged as a `/DCTDecode` image XObject, and the
// page boxes are written as real numbers so the page is exactly the
// requested size.

use std::io::Cursor;
use std::path::Path;

use bildwerk_core::PageDimensions;
use bildwerk_core::error::{BildwerkError, Result};
use image::ImageFormat;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use tracing::{debug, info, instrument};

use crate::layout::Layout;

/// Resource name the raster is drawn under.
const IMAGE_NAME: &str = "Im0";

/// Writes one image per page onto a fixed custom page size.
pub struct PdfWriter {
    /// Page size shared by every document this writer produces.
    page: PageDimensions,
    /// Density recorded in the raster; logged with each page.
    dpi: u32,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl PdfWriter {
    pub fn new(page: PageDimensions, dpi: u32) -> Self {
        Self {
            page,
            dpi,
            title: None,
        }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// `[0 0 width height]` in points.
    fn page_box(&self) -> Vec<Object> {
        vec![
            Object::Real(0.0),
            Object::Real(0.0),
            Object::Real(self.page.width_pt() as f32),
            Object::Real(self.page.height_pt() as f32),
        ]
    }

    /// Create a single-page PDF showing the JPEG at `raster_path`, placed
    /// according to `layout`.
    #[instrument(skip(self, raster_path, layout), fields(raster = %raster_path.display()))]
    pub fn create_from_raster(&self, raster_path: &Path, layout: &Layout) -> Result<Vec<u8>> {
        let jpeg = std::fs::read(raster_path).map_err(|err| {
            BildwerkError::PdfWrite(format!(
                "failed to load raster {}: {}",
                raster_path.display(),
                err
            ))
        })?;
        self.create_from_jpeg(jpeg, layout)
    }

    /// Same as [`PdfWriter::create_from_raster`] for JPEG bytes already in
    /// memory.
    pub fn create_from_jpeg(&self, jpeg: Vec<u8>, layout: &Layout) -> Result<Vec<u8>> {
        let (px_w, px_h) = jpeg_dimensions(&jpeg)?;
        let title = self.title.as_deref().unwrap_or("Bildwerk Image");

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(px_w),
                "Height" => i64::from(px_h),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        )
        .with_compression(false);
        let image_id = doc.add_object(image);

        // The unit square of the image mapped onto the layout box.
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(layout.display_width_pt as f32),
                        Object::Real(0.0),
                        Object::Real(0.0),
                        Object::Real(layout.display_height_pt as f32),
                        Object::Real(layout.x_pt as f32),
                        Object::Real(layout.y_pt as f32),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content.encode().map_err(|err| {
            BildwerkError::PdfWrite(format!("failed to encode page content: {}", err))
        })?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => self.page_box(),
            "CropBox" => self.page_box(),
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    IMAGE_NAME => image_id,
                },
            },
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "Producer" => Object::string_literal("Bildwerk"),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        debug!(
            px_w,
            px_h,
            dpi = self.dpi,
            display_w_pt = layout.display_width_pt,
            display_h_pt = layout.display_height_pt,
            x_pt = layout.x_pt,
            y_pt = layout.y_pt,
            "Image placed on page"
        );

        let mut output = Vec::new();
        doc.save_to(&mut output)
            .map_err(|err| BildwerkError::PdfWrite(format!("failed to serialise PDF: {}", err)))?;
        Ok(output)
    }

    /// Create the PDF and write it directly to `path`.
    pub fn write_raster_to_file(
        &self,
        raster_path: &Path,
        layout: &Layout,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let bytes = self.create_from_raster(raster_path, layout)?;
        std::fs::write(path.as_ref(), &bytes).map_err(|err| {
            BildwerkError::PdfWrite(format!("failed to write {}: {}", path.as_ref().display(), err))
        })?;
        info!("Wrote PDF to {}", path.as_ref().display());
        Ok(())
    }
}

/// Pixel size of a JPEG, read from its header. Anything else is rejected,
/// since only JPEG data may sit behind `/DCTDecode`.
fn jpeg_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| BildwerkError::PdfWrite(format!("unreadable raster: {}", err)))?;
    if reader.format() != Some(ImageFormat::Jpeg) {
        return Err(BildwerkError::PdfWrite(format!(
            "raster is {:?}, expected JPEG",
            reader.format()
        )));
    }
    reader
        .into_dimensions()
        .map_err(|err| BildwerkError::PdfWrite(format!("unreadable JPEG header: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageAsset;
    use crate::pdf::reader::PdfReader;
    use image::{DynamicImage, Rgb, RgbImage};

    fn jpeg(width: u32, height: u32, dpi: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([0, 128, 255])));
        let mut bytes = Vec::new();
        ImageAsset::from_dynamic("raster.png", img)
            .write_jpeg(&mut bytes, 95, dpi)
            .unwrap();
        bytes
    }

    #[test]
    fn page_matches_requested_size() {
        let page = PageDimensions::new(100.0, 100.0);
        let layout = Layout::inscribe(40, 20, &page).unwrap();
        let bytes = PdfWriter::new(page, 300)
            .create_from_jpeg(jpeg(40, 20, 300), &layout)
            .unwrap();

        let reader = PdfReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.page_count(), 1);
        let (w, h) = reader.page_size_pt(1).unwrap();
        assert!((f64::from(w) - page.width_pt()).abs() < 0.01, "width {w}");
        assert!((f64::from(h) - page.height_pt()).abs() < 0.01, "height {h}");
    }

    #[test]
    fn jpeg_is_embedded_unchanged() {
        let page = PageDimensions::new(210.0, 297.0);
        let layout = Layout::inscribe(32, 16, &page).unwrap();
        let raster = jpeg(32, 16, 150);
        let bytes = PdfWriter::new(page, 150)
            .create_from_jpeg(raster.clone(), &layout)
            .unwrap();

        let images = PdfReader::from_bytes(&bytes).unwrap().embedded_images(1).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].filter.as_deref(), Some("DCTDecode"));
        assert_eq!((images[0].width, images[0].height), (32, 16));
        assert_eq!(images[0].data, raster);
    }

    #[test]
    fn placement_is_the_layout_box() {
        let page = PageDimensions::new(100.0, 100.0);
        let layout = Layout::inscribe(4000, 1000, &page).unwrap();
        let bytes = PdfWriter::new(page, 300)
            .create_from_jpeg(jpeg(40, 10, 300), &layout)
            .unwrap();

        let matrices = PdfReader::from_bytes(&bytes).unwrap().placement_matrices(1).unwrap();
        let [w, b, c, h, x, y] = matrices[0].map(f64::from);
        assert_eq!((b, c), (0.0, 0.0));
        for (actual, expected) in [
            (w, layout.display_width_pt),
            (h, layout.display_height_pt),
            (x, layout.x_pt),
            (y, layout.y_pt),
        ] {
            assert!((actual - expected).abs() < 1e-3, "{actual} != {expected}");
        }
    }

    #[test]
    fn non_jpeg_raster_is_rejected() {
        let page = PageDimensions::new(210.0, 297.0);
        let layout = Layout::inscribe(10, 10, &page).unwrap();
        let mut png = Vec::new();
        RgbImage::from_pixel(10, 10, Rgb([1, 2, 3]))
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let err = PdfWriter::new(page, 300).create_from_jpeg(png, &layout).unwrap_err();
        assert!(matches!(err, BildwerkError::PdfWrite(_)));
    }

    #[test]
    fn missing_raster_is_a_write_error() {
        let page = PageDimensions::new(210.0, 297.0);
        let layout = Layout::inscribe(10, 10, &page).unwrap();
        let err = PdfWriter::new(page, 300)
            .create_from_raster(Path::new("/nonexistent/raster.jpg"), &layout)
            .unwrap_err();
        assert!(matches!(err, BildwerkError::PdfWrite(_)));
    }
}
