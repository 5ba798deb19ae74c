// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image asset — decode a source raster, normalise it to 8-bit RGB and
// re-encode it as the JPEG intermediate embedded into the PDF. Operates on
// in-memory images using the `image` crate.

use std::io::Write;
use std::path::{Path, PathBuf};

use bildwerk_core::error::{BildwerkError, Result};
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::{ColorType, DynamicImage};
use tracing::{debug, info, instrument};

/// JPEG quality of the intermediate raster.
pub const RASTER_QUALITY: u8 = 95;

/// One decoded source image. Lives only while its PDF is being produced.
///
/// ```ignore
/// let asset = ImageAsset::open("scans/page-1.png")?.normalize();
/// asset.write_jpeg(&mut file, RASTER_QUALITY, 300)?;
/// ```
pub struct ImageAsset {
    /// Where the image was loaded from.
    source: PathBuf,
    /// The current working image.
    image: DynamicImage,
}

impl ImageAsset {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    ///
    /// The format is guessed from the file contents, so a PNG saved with a
    /// `.jpg` extension still decodes.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|err| {
                BildwerkError::Decode(format!("failed to open {}: {}", path.display(), err))
            })?
            .decode()
            .map_err(|err| {
                BildwerkError::Decode(format!("failed to decode {}: {}", path.display(), err))
            })?;

        info!(
            width = image.width(),
            height = image.height(),
            color = ?image.color(),
            "Image loaded"
        );
        Ok(Self {
            source: path.to_path_buf(),
            image,
        })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(source: impl Into<PathBuf>, image: DynamicImage) -> Self {
        Self {
            source: source.into(),
            image,
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn color_mode(&self) -> ColorType {
        self.image.color()
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Convert to 8-bit, three-channel RGB.
    ///
    /// Alpha is discarded, not composited: transparent pixels keep whatever
    /// colour they store, which for most encoders is black. Greyscale,
    /// palette and 16-bit images are widened or narrowed to RGB8.
    #[instrument(skip(self))]
    pub fn normalize(self) -> Self {
        if matches!(self.image, DynamicImage::ImageRgb8(_)) {
            return self;
        }

        let original = self.image.color();
        if original.has_alpha() {
            debug!(?original, "Dropping alpha channel; transparency is not preserved");
        } else {
            debug!(?original, "Converting to RGB8");
        }

        Self {
            source: self.source,
            image: DynamicImage::ImageRgb8(self.image.into_rgb8()),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the image as JPEG with the given quality (1-100), tagging the
    /// JFIF header with `dpi` in both directions.
    pub fn write_jpeg(&self, writer: impl Write, quality: u8, dpi: u32) -> Result<()> {
        let density = u16::try_from(dpi).map_err(|_| {
            BildwerkError::Encode(format!("dpi {dpi} does not fit a JPEG density field"))
        })?;

        let mut encoder = JpegEncoder::new_with_quality(writer, quality);
        encoder.set_pixel_density(PixelDensity::dpi(density));

        let encoded = match self.image.as_rgb8() {
            Some(rgb) => rgb.write_with_encoder(encoder),
            None => self.image.to_rgb8().write_with_encoder(encoder),
        };
        encoded
            .map_err(|err| BildwerkError::Encode(format!("JPEG encoding failed: {}", err)))?;
        debug!(quality, dpi, "Raster encoded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn rgba_is_flattened_to_rgb() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 0])));
        let asset = ImageAsset::from_dynamic("a.png", img).normalize();

        assert_eq!(asset.color_mode(), ColorType::Rgb8);
        assert_eq!((asset.width(), asset.height()), (4, 3));
    }

    #[test]
    fn greyscale_is_widened_to_rgb() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([77u8])));
        let asset = ImageAsset::from_dynamic("g.bmp", img).normalize();

        assert_eq!(asset.color_mode(), ColorType::Rgb8);
        let rgb = asset.as_dynamic().to_rgb8();
        assert_eq!(*rgb.get_pixel(0, 0), Rgb([77, 77, 77]));
    }

    #[test]
    fn rgb_passes_through() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(5, 5, Rgb([1, 2, 3])));
        let asset = ImageAsset::from_dynamic("c.jpg", img).normalize();
        assert_eq!(asset.color_mode(), ColorType::Rgb8);
    }

    #[test]
    fn jpeg_output_decodes_with_same_size() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 8, Rgb([200, 100, 50])));
        let asset = ImageAsset::from_dynamic("c.png", img);

        let mut buffer = Vec::new();
        asset.write_jpeg(&mut buffer, RASTER_QUALITY, 300).unwrap();

        assert_eq!(&buffer[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&buffer).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }

    #[test]
    fn jpeg_records_dpi_in_jfif_header() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255])));
        let asset = ImageAsset::from_dynamic("d.png", img);

        let mut buffer = Vec::new();
        asset.write_jpeg(&mut buffer, RASTER_QUALITY, 600).unwrap();

        // SOI, APP0 marker, length, "JFIF\0", version, units=1 (dpi), X, Y.
        assert_eq!(&buffer[2..4], &[0xFF, 0xE0]);
        assert_eq!(&buffer[6..11], b"JFIF\0");
        assert_eq!(buffer[13], 1);
        assert_eq!(u16::from_be_bytes([buffer[14], buffer[15]]), 600);
        assert_eq!(u16::from_be_bytes([buffer[16], buffer[17]]), 600);
    }

    #[test]
    fn open_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        let err = ImageAsset::open(&path).err().unwrap();
        assert!(matches!(err, BildwerkError::Decode(_)));
        assert!(err.to_string().contains("bad.jpg"));
    }

    #[test]
    fn open_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        std::fs::write(&path, b"").unwrap();
        assert!(ImageAsset::open(&path).is_err());
    }
}
