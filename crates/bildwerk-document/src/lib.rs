// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bildwerk-document — Image-to-PDF conversion for Bildwerk.
//
// Provides image decoding and colour normalisation, aspect-preserving page
// layout, single-page PDF writing and inspection, directory scanning, and the
// batch converter that ties them together.

pub mod convert;
pub mod directory;
pub mod image;
pub mod layout;
pub mod pdf;

// Re-export the primary structs so callers can use `bildwerk_document::BatchConverter` etc.
pub use convert::{BatchConverter, convert_directory};
pub use crate::image::processor::ImageAsset;
pub use layout::{Bound, Layout};
pub use pdf::reader::{EmbeddedImage, PdfReader};
pub use pdf::writer::PdfWriter;
