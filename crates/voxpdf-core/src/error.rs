//! Error types for the voxpdf-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the voxpdf library.
#[derive(Error, Debug)]
pub enum VoxError {
    /// The document could not be opened at all.
    #[error("cannot open document: {0}")]
    Open(#[from] DocumentOpenError),

    /// A single page failed to process.
    #[error("page error: {0}")]
    Page(#[from] PageError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Translation service error.
    #[error("translation error: {0}")]
    Translate(#[from] TranslateError),

    /// Speech synthesis error.
    #[error("speech error: {0}")]
    Speech(#[from] SpeechError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Failure to open a document. This is the only error that aborts an
/// extraction.
#[derive(Error, Debug)]
pub enum DocumentOpenError {
    /// No file exists at the given path.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file is not a readable PDF container.
    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// The PDF is encrypted with a non-empty password.
    #[error("{} is encrypted", .0.display())]
    Encrypted(PathBuf),

    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors scoped to a single page. Recovered locally by the pipeline.
#[derive(Error, Debug)]
pub enum PageError {
    /// Embedded text could not be decoded.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Page index outside the document.
    #[error("invalid page index: {0}")]
    InvalidPage(usize),

    /// The page could not be rendered to an image.
    #[error("failed to rasterize page: {0}")]
    Rasterize(String),

    /// The OCR engine failed on this page.
    #[error(transparent)]
    Ocr(#[from] OcrError),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The OCR backend is not installed or not usable.
    #[error("OCR backend not available: {0}")]
    BackendNotAvailable(String),

    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// I/O error while preparing engine input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the translation service.
#[derive(Error, Debug)]
pub enum TranslateError {
    /// Request could not be sent or the body not read.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned status {0}")]
    Status(u16),

    /// The response body was not in the expected shape.
    #[error("unexpected response: {0}")]
    Parse(String),
}

/// Errors from the speech synthesis service.
#[derive(Error, Debug)]
pub enum SpeechError {
    /// Nothing to synthesize.
    #[error("no text to synthesize")]
    EmptyText,

    /// Request could not be sent or the body not read.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned status {status} for chunk {chunk}")]
    Status { status: u16, chunk: usize },
}

/// Result type for the voxpdf library.
pub type Result<T> = std::result::Result<T, VoxError>;
