//! Speak command - turn a PDF or text file into MP3 speech.

use std::path::PathBuf;

use clap::Args;
use console::style;

use voxpdf_core::models::language::LanguageCode;
use voxpdf_core::output::save_audio;
use voxpdf_core::services::{GoogleSpeech, SpeechSynthesizer};

use super::common::{load_config, read_input_text, spinner};

/// Arguments for the speak command.
#[derive(Args)]
pub struct SpeakArgs {
    /// Input file (PDF or UTF-8 text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output MP3 file
    #[arg(short, long, required = true)]
    output: PathBuf,

    /// Speech language (default: the configured language)
    #[arg(short, long)]
    lang: Option<LanguageCode>,
}

pub async fn run(args: SpeakArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let language = args.lang.unwrap_or_else(|| config.language.clone());
    let text = read_input_text(&args.input, &config).await?;

    let speech = GoogleSpeech::new(config.speech.clone())?;
    let pb = spinner(format!("Synthesizing speech ({})", language));
    let result = speech.synthesize(&text, &language).await;
    pb.finish_and_clear();
    let audio = result?;

    save_audio(&audio, &args.output)?;
    eprintln!(
        "{} Wrote {} bytes of audio to {}",
        style("✓").green(),
        audio.len(),
        args.output.display()
    );

    Ok(())
}
