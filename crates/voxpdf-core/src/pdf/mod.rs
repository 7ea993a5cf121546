//! PDF processing module.

mod extractor;
mod raster;

pub use extractor::{LopdfDocument, LopdfRenderer};

use std::path::Path;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::{DocumentOpenError, PageError};

/// Magnification applied when rendering a page, independently per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    pub x: f32,
    pub y: f32,
}

impl Zoom {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Same factor on both axes.
    pub fn uniform(factor: f32) -> Self {
        Self::new(factor, factor)
    }

    /// Rendering resolution for a 72 DPI base, as (x, y).
    pub fn dpi(&self) -> (u32, u32) {
        (
            (72.0 * self.x).round().max(1.0) as u32,
            (72.0 * self.y).round().max(1.0) as u32,
        )
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::uniform(2.0)
    }
}

/// How a page is turned into pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RasterBackend {
    /// Render the full page with poppler's `pdftoppm`.
    Pdftoppm,
    /// Decode the largest image embedded in the page (scanned pages).
    EmbeddedImage,
}

/// Opens documents for the extraction pipeline.
pub trait DocumentRenderer {
    /// Open a document. Dropping the returned handle releases it.
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>, DocumentOpenError>;
}

/// An opened document, addressed by zero-based page index.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Text stored in the page's content stream.
    fn embedded_text(&self, index: usize) -> Result<String, PageError>;

    /// Render a page to an image.
    fn rasterize(&self, index: usize, zoom: Zoom) -> Result<DynamicImage, PageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_dpi() {
        assert_eq!(Zoom::uniform(2.0).dpi(), (144, 144));
        assert_eq!(Zoom::new(2.5, 3.0).dpi(), (180, 216));
        assert_eq!(Zoom::uniform(0.001).dpi(), (1, 1));
    }
}
