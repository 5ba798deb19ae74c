// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Bildwerk.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Bildwerk operations.
///
/// Setup and configuration variants abort a whole run (see [`BildwerkError::is_fatal`]); every
/// other variant is local to one image and ends up as the reason of a
/// `ConversionOutcome::Failure`.
#[derive(Debug, Error)]
pub enum BildwerkError {
    // -- Run setup --
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("cannot read input directory {}: {source}", .path.display())]
    InputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create output directory {}: {source}", .path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -- Per-image errors --
    #[error("image decoding failed: {0}")]
    Decode(String),

    #[error("raster encoding failed: {0}")]
    Encode(String),

    #[error("PDF writing failed: {0}")]
    PdfWrite(String),

    #[error("PDF reading failed: {0}")]
    PdfRead(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BildwerkError {
    /// Whether this error stops the whole run rather than a single file.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration(_)
                | Self::InputDirectory { .. }
                | Self::OutputDirectory { .. }
                | Self::Serialization(_)
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BildwerkError>;
