//! Configuration structures for the extraction pipeline and services.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::error::VoxError;
use crate::models::language::LanguageCode;
use crate::ocr::{LayoutMode, OcrHint, PreprocessMode};
use crate::pdf::{RasterBackend, Zoom};

/// Main configuration for voxpdf.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VoxConfig {
    /// Language used for translation output and speech.
    pub language: LanguageCode,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Translation service configuration.
    pub translation: TranslationConfig,

    /// Speech service configuration.
    pub speech: SpeechConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Horizontal zoom applied when rasterizing a page for OCR.
    pub zoom_x: f32,

    /// Vertical zoom applied when rasterizing a page for OCR.
    pub zoom_y: f32,

    /// How pages are turned into images.
    pub raster_backend: RasterBackend,

    /// Path or name of the `pdftoppm` binary.
    pub pdftoppm_path: PathBuf,

    /// Try the empty user password on encrypted documents.
    pub decrypt_empty_password: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            zoom_x: 2.0,
            zoom_y: 2.0,
            raster_backend: RasterBackend::Pdftoppm,
            pdftoppm_path: PathBuf::from("pdftoppm"),
            decrypt_empty_password: true,
        }
    }
}

impl PdfConfig {
    /// Zoom factors as a single value.
    pub fn zoom(&self) -> Zoom {
        Zoom::new(self.zoom_x, self.zoom_y)
    }
}

/// Which OCR engine to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OcrBackend {
    /// The system `tesseract` binary.
    Tesseract,
    /// pure-onnx-ocr with PaddleOCR models from `model_dir`.
    Onnx,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Engine selection.
    pub backend: OcrBackend,

    /// Combined language hint, e.g. `eng+vie`.
    pub languages: String,

    /// Layout-analysis mode.
    pub layout: LayoutMode,

    /// Path or name of the `tesseract` binary.
    pub tesseract_path: PathBuf,

    /// Directory containing ONNX model files.
    pub model_dir: PathBuf,

    /// Keep `[UNK]` tokens emitted by the ONNX recognizer.
    pub keep_unk: bool,

    /// Image cleanup applied before recognition.
    pub preprocess: PreprocessConfig,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: OcrBackend::Tesseract,
            languages: "eng+vie".to_string(),
            layout: LayoutMode::SingleBlock,
            tesseract_path: PathBuf::from("tesseract"),
            model_dir: PathBuf::from("models"),
            keep_unk: false,
            preprocess: PreprocessConfig::default(),
        }
    }
}

impl OcrConfig {
    /// The hint passed to the engine for every page.
    pub fn hint(&self) -> OcrHint {
        OcrHint::new(self.languages.clone(), self.layout)
    }
}

/// Image preprocessing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Binarization strategy.
    pub mode: PreprocessMode,

    /// Gaussian smoothing sigma (0 disables smoothing).
    pub blur_sigma: f32,

    /// Neighbourhood radius for adaptive thresholding.
    pub block_radius: u32,

    /// Constant subtracted from the local mean.
    pub offset: i32,

    /// Contrast multiplier for fixed-level binarization.
    pub contrast: f32,

    /// Fixed binarization level; `None` picks it with Otsu's method.
    pub fixed_level: Option<u8>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            mode: PreprocessMode::Adaptive,
            blur_sigma: 1.0,
            block_radius: 15,
            offset: 10,
            contrast: 1.5,
            fixed_level: None,
        }
    }
}

/// Translation service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Endpoint of the translate API.
    pub endpoint: String,

    /// Source language (`auto` lets the service detect it).
    pub source_language: String,

    /// Maximum characters sent per request.
    pub max_chunk_chars: usize,

    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
            source_language: "auto".to_string(),
            max_chunk_chars: 4500,
            timeout_secs: 30,
        }
    }
}

/// Speech service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Endpoint of the text-to-speech API.
    pub endpoint: String,

    /// Maximum characters per synthesized chunk.
    pub max_chunk_chars: usize,

    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://translate.google.com/translate_tts".to_string(),
            max_chunk_chars: 100,
            timeout_secs: 30,
        }
    }
}

impl VoxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), VoxError> {
        let zoom_ok = |z: f32| z.is_finite() && z > 0.0;
        if !zoom_ok(self.pdf.zoom_x) || !zoom_ok(self.pdf.zoom_y) {
            return Err(VoxError::Config(format!(
                "zoom must be positive, got {}x{}",
                self.pdf.zoom_x, self.pdf.zoom_y
            )));
        }
        if self.pdf.zoom_x <= 1.0 || self.pdf.zoom_y <= 1.0 {
            warn!(
                "zoom {}x{} renders pages at or below 72 DPI; OCR accuracy will suffer",
                self.pdf.zoom_x, self.pdf.zoom_y
            );
        }
        if self.ocr.languages.trim().is_empty() {
            return Err(VoxError::Config("ocr.languages must not be empty".to_string()));
        }
        if self.ocr.preprocess.block_radius == 0 {
            return Err(VoxError::Config("ocr.preprocess.block_radius must be at least 1".to_string()));
        }
        if !(self.ocr.preprocess.blur_sigma >= 0.0) {
            return Err(VoxError::Config("ocr.preprocess.blur_sigma must not be negative".to_string()));
        }
        if self.translation.max_chunk_chars == 0 || self.speech.max_chunk_chars == 0 {
            return Err(VoxError::Config("max_chunk_chars must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = VoxConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.language.as_str(), "en");
        assert_eq!(config.ocr.languages, "eng+vie");
        assert_eq!(config.ocr.layout, LayoutMode::SingleBlock);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: VoxConfig =
            serde_json::from_str(r#"{"language": "vi", "pdf": {"zoom_x": 3.0}}"#).unwrap();
        assert_eq!(config.language.as_str(), "vi");
        assert_eq!(config.pdf.zoom_x, 3.0);
        assert_eq!(config.pdf.zoom_y, 2.0);
        assert_eq!(config.ocr.backend, OcrBackend::Tesseract);
    }

    #[test]
    fn test_enum_values_are_kebab_case() {
        let config: VoxConfig = serde_json::from_str(
            r#"{"ocr": {"backend": "onnx", "layout": "single-column", "preprocess": {"mode": "fixed"}},
                "pdf": {"raster_backend": "embedded-image"}}"#,
        )
        .unwrap();
        assert_eq!(config.ocr.backend, OcrBackend::Onnx);
        assert_eq!(config.ocr.layout, LayoutMode::SingleColumn);
        assert_eq!(config.ocr.preprocess.mode, PreprocessMode::Fixed);
        assert_eq!(config.pdf.raster_backend, RasterBackend::EmbeddedImage);
    }

    #[test]
    fn test_validate_rejects_bad_zoom() {
        let mut config = VoxConfig::default();
        config.pdf.zoom_y = 0.0;
        assert!(matches!(config.validate(), Err(VoxError::Config(_))));

        config.pdf.zoom_y = f32::NAN;
        assert!(config.validate().is_err());

        // Low zoom only warns.
        config.pdf.zoom_x = 0.5;
        config.pdf.zoom_y = 0.5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = VoxConfig::default();
        config.language = LanguageCode::new("vi");
        config.ocr.preprocess.fixed_level = Some(140);
        config.save(&path).unwrap();

        let loaded = VoxConfig::from_file(&path).unwrap();
        assert_eq!(loaded.language.as_str(), "vi");
        assert_eq!(loaded.ocr.preprocess.fixed_level, Some(140));
    }
}
