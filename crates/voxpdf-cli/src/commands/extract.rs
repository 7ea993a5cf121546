//! Extract command - PDF to text, with optional translation and speech.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{info, warn};

use voxpdf_core::models::config::VoxConfig;
use voxpdf_core::models::language::{LanguageCode, ocr_hint_for};
use voxpdf_core::output::{save_audio, save_text};
use voxpdf_core::pipeline::{ExtractedText, ExtractionReport, PageSourceKind};
use voxpdf_core::services::{GoogleSpeech, GoogleTranslator, SpeechSynthesizer, Translator};

use super::common::{extract_pdf, load_config, spinner};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output text file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Translate the extracted text into this language (e.g. "vi")
    #[arg(long)]
    to: Option<LanguageCode>,

    /// Also save the text as MP3 speech
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Document language, used for OCR and speech
    #[arg(short, long)]
    lang: Option<LanguageCode>,

    /// Render zoom for scanned pages
    #[arg(long)]
    zoom: Option<f32>,

    /// Print a per-page summary to stderr
    #[arg(long)]
    summary: bool,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    apply_overrides(&mut config, &args);

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let report = extract_pdf(&args.input, &config).await?;
    if args.summary {
        print_summary(&report);
    }

    let original = match report.text {
        ExtractedText::Text(text) => text,
        ExtractedText::NoText => {
            eprintln!("{} {}", style("!").yellow(), ExtractedText::NoText);
            return Ok(());
        }
    };

    // A failed translation keeps the extracted text.
    let (text, speech_language) = match &args.to {
        Some(dest) => match translate(&original, dest, &config).await {
            Ok(translated) => (translated, dest.clone()),
            Err(e) => {
                warn!("Translation failed: {}", e);
                eprintln!(
                    "{} Translation failed ({}), keeping the original text",
                    style("!").yellow(),
                    e
                );
                (original, config.language.clone())
            }
        },
        None => (original, config.language.clone()),
    };

    match &args.output {
        Some(path) => {
            save_text(&text, path)?;
            eprintln!("{} Text written to {}", style("✓").green(), path.display());
        }
        None => println!("{}", text),
    }

    if let Some(audio_path) = &args.audio {
        let pb = spinner(format!("Synthesizing speech ({})", speech_language));
        let speech = GoogleSpeech::new(config.speech.clone())?;
        let audio = speech.synthesize(&text, &speech_language).await;
        pb.finish_and_clear();

        save_audio(&audio?, audio_path)?;
        eprintln!("{} Audio written to {}", style("✓").green(), audio_path.display());
    }

    info!("Done in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

/// Fold command-line flags into the loaded config.
fn apply_overrides(config: &mut VoxConfig, args: &ExtractArgs) {
    if let Some(zoom) = args.zoom {
        config.pdf.zoom_x = zoom;
        config.pdf.zoom_y = zoom;
    }
    if let Some(lang) = &args.lang {
        config.language = lang.clone();
    }
    if args.lang.is_some() || args.to.is_some() {
        let mut languages = vec![config.language.clone()];
        languages.extend(args.to.clone());
        config.ocr.languages = ocr_hint_for(&languages);
    }
}

async fn translate(text: &str, dest: &LanguageCode, config: &VoxConfig) -> anyhow::Result<String> {
    let pb = spinner(format!("Translating to {}", dest));
    let translator = GoogleTranslator::new(config.translation.clone())?;
    let result = translator.translate(text, dest).await;
    pb.finish_and_clear();
    Ok(result?)
}

fn print_summary(report: &ExtractionReport) {
    eprintln!("{}", style("Pages").bold());
    for page in &report.pages {
        let source = match page.source {
            PageSourceKind::Embedded => style("text").green(),
            PageSourceKind::Ocr => style("ocr").cyan(),
            PageSourceKind::Empty => style("empty").dim(),
            PageSourceKind::Failed => style("failed").red(),
        };
        match &page.error {
            Some(error) => eprintln!("  {:>4}  {:<6} {}", page.index + 1, source, error),
            None => eprintln!("  {:>4}  {:<6} {} chars", page.index + 1, source, page.chars),
        }
    }
    eprintln!(
        "  {} pages, {} via OCR, {} failed",
        report.pages.len(),
        report.ocr_pages(),
        report.failed_pages()
    );
}
