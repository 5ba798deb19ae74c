// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — writing single-image pages and inspecting the result.

pub mod reader;
pub mod writer;

pub use reader::{EmbeddedImage, PdfReader};
pub use writer::PdfWriter;
