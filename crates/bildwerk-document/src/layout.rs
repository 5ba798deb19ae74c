// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page layout — inscribe an image into a page while preserving its aspect
// ratio, then centre it.

use bildwerk_core::PageDimensions;
use bildwerk_core::error::{BildwerkError, Result};

/// Where an image lands on its page, in PDF points.
///
/// `x_pt`/`y_pt` are the lower-left corner of the image. One display
/// dimension always equals the page dimension; the other is smaller or equal
/// and centred.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub display_width_pt: f64,
    pub display_height_pt: f64,
    pub x_pt: f64,
    pub y_pt: f64,
}

/// Which page edge the scaled image touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Width,
    Height,
}

impl Layout {
    /// Compute the inscribed, centred placement of a `pixel_width` x
    /// `pixel_height` image on `page`.
    pub fn inscribe(pixel_width: u32, pixel_height: u32, page: &PageDimensions) -> Result<Self> {
        if pixel_width == 0 || pixel_height == 0 {
            return Err(BildwerkError::Decode(format!(
                "image has zero size ({pixel_width}x{pixel_height})"
            )));
        }

        let image_ratio = f64::from(pixel_width) / f64::from(pixel_height);
        let page_width = page.width_pt();
        let page_height = page.height_pt();

        let (display_width_pt, display_height_pt) = match bound_for(image_ratio, page) {
            Bound::Height => (page_height * image_ratio, page_height),
            Bound::Width => (page_width, page_width / image_ratio),
        };

        Ok(Self {
            display_width_pt,
            display_height_pt,
            x_pt: (page_width - display_width_pt) / 2.0,
            y_pt: (page_height - display_height_pt) / 2.0,
        })
    }

    /// Width over height of the placed image.
    pub fn aspect_ratio(&self) -> f64 {
        self.display_width_pt / self.display_height_pt
    }
}

/// A page relatively narrower than the image limits the width; otherwise the
/// height is the limit.
pub fn bound_for(image_ratio: f64, page: &PageDimensions) -> Bound {
    if page.width_pt() / page.height_pt() > image_ratio {
        Bound::Height
    } else {
        Bound::Width
    }
}
