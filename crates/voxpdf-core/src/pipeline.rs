//! Page-by-page text extraction with an OCR fallback.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{DocumentOpenError, PageError, VoxError};
use crate::models::config::VoxConfig;
use crate::ocr::{ImagePreprocessor, OcrEngine, OcrHint, create_engine};
use crate::pdf::{DocumentRenderer, LopdfRenderer, PageSource, Zoom};

/// Shown in place of text when a document yields nothing.
pub const NO_TEXT_MESSAGE: &str = "No text could be extracted from the PDF file";

/// Outcome of a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedText {
    /// Page contributions joined by blank lines.
    Text(String),
    /// The document opened but no page produced any text.
    NoText,
}

impl ExtractedText {
    /// The extracted text, or `None` for [`ExtractedText::NoText`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExtractedText::Text(text) => Some(text),
            ExtractedText::NoText => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ExtractedText::NoText)
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractedText::Text(text) => f.write_str(text),
            ExtractedText::NoText => f.write_str(NO_TEXT_MESSAGE),
        }
    }
}

/// Where a page's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSourceKind {
    /// Embedded text layer.
    Embedded,
    /// OCR of the rendered page.
    Ocr,
    /// Processed without error but no text found.
    Empty,
    /// Both text extraction and OCR failed.
    Failed,
}

/// Per-page record kept alongside the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    /// Zero-based page index.
    pub index: usize,
    pub source: PageSourceKind,
    /// Characters contributed to the result.
    pub chars: usize,
    /// Failure description for [`PageSourceKind::Failed`] pages.
    pub error: Option<String>,
}

/// Text plus the per-page report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    pub text: ExtractedText,
    pub pages: Vec<PageReport>,
}

impl ExtractionReport {
    /// Number of pages that went through OCR.
    pub fn ocr_pages(&self) -> usize {
        self.count(PageSourceKind::Ocr)
    }

    /// Number of pages that failed entirely.
    pub fn failed_pages(&self) -> usize {
        self.count(PageSourceKind::Failed)
    }

    fn count(&self, kind: PageSourceKind) -> usize {
        self.pages.iter().filter(|p| p.source == kind).count()
    }
}

/// Extraction pipeline over a renderer and an OCR engine.
///
/// Holds no per-document state, so repeated calls on an unchanged file
/// return the same result.
pub struct ExtractionPipeline<R, O> {
    renderer: R,
    ocr: O,
    preprocessor: ImagePreprocessor,
    hint: OcrHint,
    zoom: Zoom,
}

impl ExtractionPipeline<LopdfRenderer, Box<dyn OcrEngine>> {
    /// Build the lopdf-backed pipeline with the configured OCR engine.
    pub fn from_config(config: &VoxConfig) -> Result<Self, VoxError> {
        config.validate()?;
        let renderer = LopdfRenderer::new(config.pdf.clone());
        let ocr = create_engine(&config.ocr)?;
        Ok(Self::with_config(renderer, ocr, config))
    }
}

impl<R: DocumentRenderer, O: OcrEngine> ExtractionPipeline<R, O> {
    /// Create a pipeline with default preprocessing, hint and zoom.
    pub fn new(renderer: R, ocr: O) -> Self {
        let config = VoxConfig::default();
        Self::with_config(renderer, ocr, &config)
    }

    /// Create a pipeline using the OCR and PDF sections of `config`.
    pub fn with_config(renderer: R, ocr: O, config: &VoxConfig) -> Self {
        Self {
            renderer,
            ocr,
            preprocessor: ImagePreprocessor::new(config.ocr.preprocess.clone()),
            hint: config.ocr.hint(),
            zoom: config.pdf.zoom(),
        }
    }

    /// Extract the text of the document at `path`.
    ///
    /// Only a failure to open the document is an error; page failures are
    /// logged and skipped.
    pub fn extract(&self, path: &Path) -> Result<ExtractedText, DocumentOpenError> {
        Ok(self.extract_with_report(path)?.text)
    }

    /// Like [`extract`](Self::extract), also returning what happened to each page.
    pub fn extract_with_report(&self, path: &Path) -> Result<ExtractionReport, DocumentOpenError> {
        let start = Instant::now();
        let document = self.renderer.open(path)?;
        let page_count = document.page_count();
        info!("Extracting {} ({} pages)", path.display(), page_count);

        let mut text = String::new();
        let mut pages = Vec::with_capacity(page_count);

        for index in 0..page_count {
            let report = match self.process_page(document.as_ref(), index) {
                Ok((source, contribution)) => {
                    // Keep indentation on the page's first line.
                    let contribution = if contribution.trim().is_empty() {
                        ""
                    } else {
                        contribution.trim_start_matches(['\r', '\n']).trim_end()
                    };
                    if !contribution.is_empty() {
                        text.push_str(contribution);
                        text.push_str("\n\n");
                    }
                    let source = if contribution.is_empty() {
                        PageSourceKind::Empty
                    } else {
                        source
                    };
                    PageReport {
                        index,
                        source,
                        chars: contribution.chars().count(),
                        error: None,
                    }
                }
                Err(e) => {
                    warn!("Skipping page {}: {}", index + 1, e);
                    PageReport {
                        index,
                        source: PageSourceKind::Failed,
                        chars: 0,
                        error: Some(e.to_string()),
                    }
                }
            };
            pages.push(report);
        }

        drop(document);

        let trimmed = text.trim();
        let text = if trimmed.is_empty() {
            ExtractedText::NoText
        } else {
            ExtractedText::Text(trimmed.to_string())
        };

        debug!(
            "Extraction finished in {}ms: {} pages, {} via OCR, {} failed",
            start.elapsed().as_millis(),
            pages.len(),
            pages.iter().filter(|p| p.source == PageSourceKind::Ocr).count(),
            pages.iter().filter(|p| p.source == PageSourceKind::Failed).count()
        );

        Ok(ExtractionReport { text, pages })
    }

    fn process_page(
        &self,
        document: &dyn PageSource,
        index: usize,
    ) -> Result<(PageSourceKind, String), PageError> {
        match document.embedded_text(index) {
            Ok(embedded) if !embedded.trim().is_empty() => {
                debug!("Page {}: {} chars of embedded text", index + 1, embedded.len());
                return Ok((PageSourceKind::Embedded, embedded));
            }
            Ok(_) => debug!("Page {}: no embedded text, falling back to OCR", index + 1),
            Err(e) => debug!("Page {}: text extraction failed ({}), trying OCR", index + 1, e),
        }

        let raster = document.rasterize(index, self.zoom)?;
        let prepared = self.preprocessor.prepare(&raster);
        drop(raster);

        let recognized = self.ocr.recognize(&prepared, &self.hint)?;
        debug!(
            "Page {}: {} recognized {} chars",
            index + 1,
            self.ocr.name(),
            recognized.trim().len()
        );
        Ok((PageSourceKind::Ocr, recognized))
    }
}
