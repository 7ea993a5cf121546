//! Core library for voxpdf.
//!
//! This crate provides:
//! - PDF page access (embedded text, page rasterization)
//! - Image preprocessing and OCR for pages without a text layer
//! - The extraction pipeline that combines the two page by page
//! - Clients for translation and text-to-speech services
//! - Configuration and output helpers

pub mod error;
pub mod models;
pub mod ocr;
pub mod output;
pub mod pdf;
pub mod pipeline;
pub mod services;

pub use error::{DocumentOpenError, OcrError, PageError, Result, SpeechError, TranslateError, VoxError};
pub use models::config::VoxConfig;
pub use models::language::{LanguageCode, ocr_hint_for};
pub use ocr::{ImagePreprocessor, LayoutMode, OcrEngine, OcrHint, TesseractEngine, create_engine};
#[cfg(feature = "onnx")]
pub use ocr::OnnxOcrEngine;
pub use output::{save_audio, save_text};
pub use pdf::{DocumentRenderer, LopdfRenderer, PageSource, Zoom};
pub use pipeline::{ExtractedText, ExtractionPipeline, ExtractionReport, NO_TEXT_MESSAGE, PageReport, PageSourceKind};
pub use services::{GoogleSpeech, GoogleTranslator, SpeechAudio, SpeechSynthesizer, Translator};
