// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion,
// shown by the command-line front end next to the raw error text.

use std::io::ErrorKind;

use crate::error::BildwerkError;

/// How far the damage of an error reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Nothing was converted; the run stopped before the first file.
    RunAborted,
    /// Only one image was skipped; the others were still converted.
    FileSkipped,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `BildwerkError` into a `HumanError`.
pub fn humanize_error(err: &BildwerkError) -> HumanError {
    let severity = if err.is_fatal() {
        Severity::RunAborted
    } else {
        Severity::FileSkipped
    };

    let (message, suggestion) = match err {
        BildwerkError::InvalidConfiguration(_) => (
            "The settings for this run are not valid.",
            "Use a page size of A3, A4, A5, letter or legal, or WIDTHxHEIGHT in millimetres, and a dpi above zero.",
        ),
        BildwerkError::InputDirectory { source, .. } => match source.kind() {
            ErrorKind::NotFound => (
                "The image folder does not exist.",
                "Check the spelling of the input folder path.",
            ),
            ErrorKind::PermissionDenied => (
                "The image folder cannot be opened.",
                "Make sure you have permission to read the input folder.",
            ),
            _ => (
                "The image folder could not be read.",
                "Check that the input path points to a folder.",
            ),
        },
        BildwerkError::OutputDirectory { source, .. } => match source.kind() {
            ErrorKind::PermissionDenied => (
                "The output folder cannot be created here.",
                "Pick an output folder you are allowed to write to.",
            ),
            _ => (
                "The output folder could not be created.",
                "Check that the output path is not an existing file and the disk is not full.",
            ),
        },
        BildwerkError::Decode(_) => (
            "This file is not a readable image.",
            "The file may be damaged or only named like an image. Try opening it in an image viewer.",
        ),
        BildwerkError::Encode(_) | BildwerkError::PdfWrite(_) | BildwerkError::Io(_) => (
            "The PDF for this image could not be written.",
            "Check that the output folder is writable and the disk has free space.",
        ),
        BildwerkError::PdfRead(_) => (
            "A produced PDF could not be read back.",
            "Delete the file and run the conversion again.",
        ),
        BildwerkError::Serialization(_) => (
            "The configuration file is not valid.",
            "The file must be JSON with input_dir, output_dir and optionally page_size and dpi.",
        ),
    };

    HumanError {
        message: message.into(),
        suggestion: suggestion.into(),
        severity,
    }
}
