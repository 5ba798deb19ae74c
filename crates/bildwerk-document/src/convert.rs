// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch conversion — one single-page PDF per image in a folder.
//
// Pipeline per file: decode → normalise to RGB → inscribe into the page →
// encode a temporary JPEG next to the output → place it on a PDF page →
// write → remove the temporary JPEG. A failing file becomes a
// `ConversionOutcome::Failure`; only setup problems stop the run.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::{ConversionOutcome, ConversionRequest, PageDimensions, RunReport};
use tempfile::{Builder, NamedTempFile};
use tracing::{debug, info, instrument, warn};

use crate::directory::{ensure_output_dir, list_images, output_path_for};
use crate::image::{ImageAsset, RASTER_QUALITY};
use crate::layout::Layout;
use crate::pdf::{PdfReader, PdfWriter};

/// Tolerance, in points, when checking a written page. Covers the f32
/// precision of PDF real numbers.
const PAGE_TOLERANCE_PT: f64 = 0.01;

/// Converts every supported image in a folder, one file at a time.
pub struct BatchConverter {
    request: ConversionRequest,
    /// Resolved once; read-only for the whole run.
    page: PageDimensions,
}

impl BatchConverter {
    /// Validate the request and resolve its page size.
    ///
    /// Fails with `InvalidConfiguration` before any file is touched.
    pub fn new(request: ConversionRequest) -> Result<Self> {
        let page = request.validate()?;
        info!(
            input = %request.input_dir.display(),
            output = %request.output_dir.display(),
            page = %page,
            dpi = request.dpi,
            "Batch converter ready"
        );
        Ok(Self { request, page })
    }

    pub fn request(&self) -> &ConversionRequest {
        &self.request
    }

    pub fn page(&self) -> PageDimensions {
        self.page
    }

    /// List the input images and make sure the output folder exists.
    pub fn prepare(&self) -> Result<Vec<PathBuf>> {
        let sources = list_images(&self.request.input_dir)?;
        ensure_output_dir(&self.request.output_dir)?;
        Ok(sources)
    }

    /// Convert every image, logging each outcome.
    pub fn run(&self) -> Result<RunReport> {
        self.run_with(|_| {})
    }

    /// Convert every image, handing each outcome to `observer` as soon as it
    /// is known.
    #[instrument(skip_all, fields(input = %self.request.input_dir.display()))]
    pub fn run_with(&self, mut observer: impl FnMut(&ConversionOutcome)) -> Result<RunReport> {
        let sources = self.prepare()?;
        let mut report = RunReport::default();

        for source in &sources {
            let outcome = self.convert_file(source);
            match &outcome {
                ConversionOutcome::Success { output, .. } => info!(
                    source = %source.display(),
                    output = %output.display(),
                    page = %self.page,
                    "Converted"
                ),
                ConversionOutcome::Failure { reason, .. } => warn!(
                    source = %source.display(),
                    reason = %reason,
                    "Conversion failed"
                ),
            }
            observer(&outcome);
            report.push(outcome);
        }

        info!(
            total = report.total(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Batch finished"
        );
        Ok(report)
    }

    /// Convert one image. Never fails: errors become a `Failure` outcome.
    ///
    /// Creates the output folder when it is missing, so it can be called
    /// without [`BatchConverter::prepare`].
    pub fn convert_file(&self, source: &Path) -> ConversionOutcome {
        match self.try_convert(source) {
            Ok(output) => ConversionOutcome::Success {
                source: source.to_path_buf(),
                output,
                page: self.page,
            },
            Err(err) => ConversionOutcome::Failure {
                source: source.to_path_buf(),
                reason: err.to_string(),
            },
        }
    }

    #[instrument(skip_all, fields(source = %source.display()))]
    fn try_convert(&self, source: &Path) -> Result<PathBuf> {
        ensure_output_dir(&self.request.output_dir)?;
        let asset = ImageAsset::open(source)?.normalize();
        let layout = Layout::inscribe(asset.width(), asset.height(), &self.page)?;
        debug!(?layout, "Layout computed");

        // Removed on drop, so every early return below cleans up too.
        let raster = self.encode_raster(&asset)?;
        drop(asset);

        let output = output_path_for(source, &self.request.output_dir);
        let mut writer = PdfWriter::new(self.page, self.request.dpi);
        if let Some(stem) = source.file_stem() {
            writer.set_title(stem.to_string_lossy());
        }
        writer.write_raster_to_file(raster.path(), &layout, &output)?;

        let raster_path = raster.path().to_path_buf();
        if let Err(err) = raster.close() {
            warn!(path = %raster_path.display(), error = %err, "Temporary raster not removed");
        }
        Ok(output)
    }

    /// Write the intermediate JPEG to a uniquely named file in the output
    /// folder.
    fn encode_raster(&self, asset: &ImageAsset) -> Result<NamedTempFile> {
        let mut raster = Builder::new()
            .prefix(".bildwerk-")
            .suffix(".jpg")
            .tempfile_in(&self.request.output_dir)
            .map_err(|err| {
                BildwerkError::Encode(format!(
                    "failed to create temporary raster in {}: {}",
                    self.request.output_dir.display(),
                    err
                ))
            })?;

        let mut out = BufWriter::new(raster.as_file_mut());
        asset.write_jpeg(&mut out, RASTER_QUALITY, self.request.dpi)?;
        out.flush()
            .map_err(|err| BildwerkError::Encode(format!("failed to flush raster: {}", err)))?;
        drop(out);

        debug!(path = %raster.path().display(), "Temporary raster written");
        Ok(raster)
    }

    /// Re-open a produced PDF and check it has one page of the run's size,
    /// with every placed image inside the page.
    pub fn verify(&self, output: &Path) -> Result<()> {
        let reader = PdfReader::open(output)?;
        if reader.page_count() != 1 {
            return Err(BildwerkError::PdfRead(format!(
                "{} has {} pages, expected 1",
                output.display(),
                reader.page_count()
            )));
        }

        let (width, height) = reader.page_size_pt(1)?;
        let (width, height) = (f64::from(width), f64::from(height));
        let off_width = (width - self.page.width_pt()).abs();
        let off_height = (height - self.page.height_pt()).abs();
        if off_width > PAGE_TOLERANCE_PT || off_height > PAGE_TOLERANCE_PT {
            return Err(BildwerkError::PdfRead(format!(
                "{} is {}x{}pt, expected {:.2}x{:.2}pt",
                output.display(),
                width,
                height,
                self.page.width_pt(),
                self.page.height_pt()
            )));
        }

        for [w, _, _, h, x, y] in reader.placement_matrices(1)? {
            let (w, h, x, y) = (f64::from(w), f64::from(h), f64::from(x), f64::from(y));
            let inside = x >= -PAGE_TOLERANCE_PT
                && y >= -PAGE_TOLERANCE_PT
                && x + w <= width + PAGE_TOLERANCE_PT
                && y + h <= height + PAGE_TOLERANCE_PT;
            if !inside {
                return Err(BildwerkError::PdfRead(format!(
                    "{}: image at {}x{}+{}+{}pt overflows the page",
                    output.display(),
                    w,
                    h,
                    x,
                    y
                )));
            }
        }
        Ok(())
    }
}

/// Convert a whole folder in one call.
pub fn convert_directory(request: ConversionRequest) -> Result<RunReport> {
    BatchConverter::new(request)?.run()
}
