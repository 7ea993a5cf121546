//! OCR engines and the image cleanup that precedes them.

#[cfg(feature = "onnx")]
mod onnx;
mod preprocessing;
mod tesseract;

#[cfg(feature = "onnx")]
pub use onnx::OnnxOcrEngine;
pub use preprocessing::{ImagePreprocessor, PreprocessMode};
pub use tesseract::TesseractEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;
use crate::models::config::{OcrBackend, OcrConfig};

/// Expected text layout on the page, mapped to Tesseract page-segmentation modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    /// Fully automatic page segmentation.
    Auto,
    /// A single column of text of variable sizes.
    SingleColumn,
    /// A single uniform block of prose.
    SingleBlock,
    /// Scattered text in no particular order.
    Sparse,
}

impl LayoutMode {
    /// Tesseract `--psm` value.
    pub fn psm(&self) -> u8 {
        match self {
            LayoutMode::Auto => 3,
            LayoutMode::SingleColumn => 4,
            LayoutMode::SingleBlock => 6,
            LayoutMode::Sparse => 11,
        }
    }
}

/// Per-call recognition parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrHint {
    /// Combined language hint, e.g. `eng+vie`.
    pub languages: String,
    pub layout: LayoutMode,
}

impl OcrHint {
    pub fn new(languages: impl Into<String>, layout: LayoutMode) -> Self {
        Self {
            languages: languages.into(),
            layout,
        }
    }
}

impl Default for OcrHint {
    fn default() -> Self {
        Self::new("eng", LayoutMode::SingleBlock)
    }
}

/// Converts an image into text.
pub trait OcrEngine {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Recognize the text in `image`. An image without text yields an empty string.
    fn recognize(&self, image: &DynamicImage, hint: &OcrHint) -> Result<String, OcrError>;
}

impl<T: OcrEngine + ?Sized> OcrEngine for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn recognize(&self, image: &DynamicImage, hint: &OcrHint) -> Result<String, OcrError> {
        (**self).recognize(image, hint)
    }
}

/// Build the engine selected in the configuration.
pub fn create_engine(config: &OcrConfig) -> Result<Box<dyn OcrEngine>, OcrError> {
    match config.backend {
        OcrBackend::Tesseract => Ok(Box::new(TesseractEngine::new(&config.tesseract_path))),
        #[cfg(feature = "onnx")]
        OcrBackend::Onnx => Ok(Box::new(OnnxOcrEngine::from_dir(&config.model_dir, config.keep_unk)?)),
        #[cfg(not(feature = "onnx"))]
        OcrBackend::Onnx => Err(OcrError::BackendNotAvailable(
            "built without the `onnx` feature".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_psm_values() {
        assert_eq!(LayoutMode::Auto.psm(), 3);
        assert_eq!(LayoutMode::SingleColumn.psm(), 4);
        assert_eq!(LayoutMode::SingleBlock.psm(), 6);
        assert_eq!(LayoutMode::Sparse.psm(), 11);
    }

    #[test]
    fn test_create_tesseract_engine() {
        let engine = create_engine(&OcrConfig::default()).unwrap();
        assert_eq!(engine.name(), "tesseract");
    }
}
