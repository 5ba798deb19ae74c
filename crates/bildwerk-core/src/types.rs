// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Bildwerk converter.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BildwerkError, Result};

/// Points per millimetre used for every page-size conversion.
pub const PT_PER_MM: f64 = 2.83464567;

/// Named paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaperSize {
    A3,
    A4,
    A5,
    Letter,
    Legal,
}

impl PaperSize {
    pub const ALL: [PaperSize; 5] = [Self::A3, Self::A4, Self::A5, Self::Letter, Self::Legal];

    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (f64, f64) {
        match self {
            Self::A3 => (297.0, 420.0),
            Self::A4 => (210.0, 297.0),
            Self::A5 => (148.0, 210.0),
            Self::Letter => (216.0, 279.0),
            Self::Legal => (216.0, 356.0),
        }
    }

    /// Canonical name, as accepted by [`PaperSize::from_str`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::A3 => "A3",
            Self::A4 => "A4",
            Self::A5 => "A5",
            Self::Letter => "letter",
            Self::Legal => "legal",
        }
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PaperSize {
    type Err = BildwerkError;

    /// Case-insensitive preset lookup.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                BildwerkError::InvalidConfiguration(format!(
                    "unknown page size '{wanted}' (use A3, A4, A5, letter, legal or WIDTHxHEIGHT in mm)"
                ))
            })
    }
}

/// Requested page size: a named preset or explicit millimetre dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPageSize", into = "RawPageSize")]
pub enum PageSizeSpec {
    Preset(PaperSize),
    Explicit { width_mm: f64, height_mm: f64 },
}

impl Default for PageSizeSpec {
    fn default() -> Self {
        Self::Preset(PaperSize::A4)
    }
}

impl PageSizeSpec {
    /// Build an explicit size from a list of numbers.
    ///
    /// Exactly two positive, finite values are accepted.
    pub fn from_values(values: &[f64]) -> Result<Self> {
        match *values {
            [width_mm, height_mm] => {
                check_dimension("width", width_mm)?;
                check_dimension("height", height_mm)?;
                Ok(Self::Explicit {
                    width_mm,
                    height_mm,
                })
            }
            _ => Err(BildwerkError::InvalidConfiguration(format!(
                "custom page size needs exactly 2 values (width, height), got {}",
                values.len()
            ))),
        }
    }

    /// Parse a preset name or a `WIDTHxHEIGHT` / `WIDTH,HEIGHT` pair in mm.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
            return trimmed.parse::<PaperSize>().map(Self::Preset);
        }

        let values = trimmed
            .split(['x', 'X', ','])
            .map(|part| {
                part.trim().parse::<f64>().map_err(|_| {
                    BildwerkError::InvalidConfiguration(format!(
                        "invalid page size '{trimmed}': '{}' is not a number",
                        part.trim()
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        Self::from_values(&values)
    }

    /// Resolve to concrete page dimensions.
    pub fn resolve(&self) -> Result<PageDimensions> {
        match *self {
            Self::Preset(preset) => {
                let (width_mm, height_mm) = preset.dimensions_mm();
                Ok(PageDimensions::new(width_mm, height_mm))
            }
            Self::Explicit {
                width_mm,
                height_mm,
            } => {
                check_dimension("width", width_mm)?;
                check_dimension("height", height_mm)?;
                Ok(PageDimensions::new(width_mm, height_mm))
            }
        }
    }
}

impl FromStr for PageSizeSpec {
    type Err = BildwerkError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PageSizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preset(preset) => write!(f, "{preset}"),
            Self::Explicit {
                width_mm,
                height_mm,
            } => write!(f, "{width_mm}x{height_mm}"),
        }
    }
}

fn check_dimension(axis: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BildwerkError::InvalidConfiguration(format!(
            "page {axis} must be a positive number of millimetres, got {value}"
        )))
    }
}

/// Wire form of [`PageSizeSpec`] in configuration files: `"A4"` or `[100, 100]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPageSize {
    Name(String),
    Values(Vec<f64>),
}

impl TryFrom<RawPageSize> for PageSizeSpec {
    type Error = BildwerkError;

    fn try_from(raw: RawPageSize) -> Result<Self> {
        match raw {
            RawPageSize::Name(name) => Self::parse(&name),
            RawPageSize::Values(values) => Self::from_values(&values),
        }
    }
}

impl From<PageSizeSpec> for RawPageSize {
    fn from(spec: PageSizeSpec) -> Self {
        match spec {
            PageSizeSpec::Preset(preset) => Self::Name(preset.name().to_string()),
            PageSizeSpec::Explicit {
                width_mm,
                height_mm,
            } => Self::Values(vec![width_mm, height_mm]),
        }
    }
}

/// Resolved page size. Computed once per run and shared read-only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDimensions {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageDimensions {
    pub fn new(width_mm: f64, height_mm: f64) -> Self {
        Self {
            width_mm,
            height_mm,
        }
    }

    pub fn width_pt(&self) -> f64 {
        self.width_mm * PT_PER_MM
    }

    pub fn height_pt(&self) -> f64 {
        self.height_mm * PT_PER_MM
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width_mm / self.height_mm
    }
}

impl fmt::Display for PageDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}mm", self.width_mm, self.height_mm)
    }
}

/// Result of converting one source image.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    Success {
        source: PathBuf,
        output: PathBuf,
        page: PageDimensions,
    },
    Failure {
        source: PathBuf,
        reason: String,
    },
}

impl ConversionOutcome {
    pub fn source(&self) -> &Path {
        match self {
            Self::Success { source, .. } | Self::Failure { source, .. } => source,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl fmt::Display for ConversionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success {
                source,
                output,
                page,
            } => write!(
                f,
                "converted: {} -> {} (page size: {page})",
                file_label(source),
                file_label(output)
            ),
            Self::Failure { source, reason } => {
                write!(f, "failed: {}: {reason}", file_label(source))
            }
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Every outcome of one run, in processing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub outcomes: Vec<ConversionOutcome>,
}

impl RunReport {
    pub fn push(&mut self, outcome: ConversionOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// True when no file failed (an empty run is clean).
    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &ConversionOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}
