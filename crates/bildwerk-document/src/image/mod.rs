// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decoding, colour normalisation and intermediate JPEG encoding.

pub mod processor;

pub use processor::{ImageAsset, RASTER_QUALITY};
