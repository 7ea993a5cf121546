//! Helpers shared by the subcommands.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use voxpdf_core::models::config::VoxConfig;
use voxpdf_core::pipeline::{ExtractedText, ExtractionPipeline, ExtractionReport};

/// `<config_dir>/voxpdf/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("voxpdf")
        .join("config.json")
}

/// Load the config named by `--config`, else the default file if present,
/// else built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<VoxConfig> {
    let config = match config_path {
        Some(path) => VoxConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => {
            let path = default_config_path();
            if path.exists() {
                debug!("Using config file {}", path.display());
                VoxConfig::from_file(&path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))?
            } else {
                VoxConfig::default()
            }
        }
    };
    Ok(config)
}

/// Spinner on stderr for long-running steps.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Run the extraction pipeline on a worker thread.
///
/// Rendering and OCR block, so the pipeline is built and driven inside
/// `spawn_blocking`.
pub async fn extract_pdf(path: &Path, config: &VoxConfig) -> anyhow::Result<ExtractionReport> {
    let path = path.to_path_buf();
    let config = config.clone();

    let pb = spinner(format!("Extracting {}", path.display()));
    let result = tokio::task::spawn_blocking(move || -> anyhow::Result<ExtractionReport> {
        let pipeline = ExtractionPipeline::from_config(&config)?;
        Ok(pipeline.extract_with_report(&path)?)
    })
    .await
    .context("Extraction task panicked")?;
    pb.finish_and_clear();

    let report = result?;
    info!(
        "Extracted {} pages ({} via OCR, {} failed)",
        report.pages.len(),
        report.ocr_pages(),
        report.failed_pages()
    );
    Ok(report)
}

/// Text of a PDF (extracted) or of a UTF-8 text file.
pub async fn read_input_text(input: &Path, config: &VoxConfig) -> anyhow::Result<String> {
    if is_pdf(input) {
        match extract_pdf(input, config).await?.text {
            ExtractedText::Text(text) => Ok(text),
            ExtractedText::NoText => anyhow::bail!("{}", ExtractedText::NoText),
        }
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))
    }
}
