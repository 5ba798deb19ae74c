// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion request: the complete configuration of one batch run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BildwerkError, Result};
use crate::types::{PageDimensions, PageSizeSpec};

/// Resolution used when none is given.
pub const DEFAULT_DPI: u32 = 300;

/// Everything a batch run needs. Immutable for the duration of the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// Folder scanned (non-recursively) for images.
    pub input_dir: PathBuf,
    /// Folder receiving one PDF per image; created when missing.
    pub output_dir: PathBuf,
    /// Preset name or explicit millimetre pair.
    #[serde(default)]
    pub page_size: PageSizeSpec,
    /// Density tagged onto the intermediate raster.
    #[serde(default = "default_dpi")]
    pub dpi: u32,
}

fn default_dpi() -> u32 {
    DEFAULT_DPI
}

impl ConversionRequest {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            page_size: PageSizeSpec::default(),
            dpi: DEFAULT_DPI,
        }
    }

    pub fn with_page_size(mut self, page_size: PageSizeSpec) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Load a request from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let request: Self = serde_json::from_str(&text)?;
        Ok(request)
    }

    /// Check every field and resolve the page size.
    ///
    /// Fails with [`BildwerkError::InvalidConfiguration`] before any file is
    /// touched.
    pub fn validate(&self) -> Result<PageDimensions> {
        if self.input_dir.as_os_str().is_empty() {
            return Err(BildwerkError::InvalidConfiguration(
                "input directory must not be empty".into(),
            ));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(BildwerkError::InvalidConfiguration(
                "output directory must not be empty".into(),
            ));
        }
        // JFIF stores the density as a 16-bit value.
        if self.dpi == 0 || self.dpi > u32::from(u16::MAX) {
            return Err(BildwerkError::InvalidConfiguration(format!(
                "dpi must be between 1 and {}, got {}",
                u16::MAX,
                self.dpi
            )));
        }
        self.page_size.resolve()
    }
}
