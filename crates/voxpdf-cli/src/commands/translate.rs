//! Translate command - translate a PDF or text file.

use std::path::PathBuf;

use clap::Args;
use console::style;

use voxpdf_core::models::language::LanguageCode;
use voxpdf_core::output::save_text;
use voxpdf_core::services::{GoogleTranslator, Translator};

use super::common::{load_config, read_input_text, spinner};

/// Arguments for the translate command.
#[derive(Args)]
pub struct TranslateArgs {
    /// Input file (PDF or UTF-8 text)
    #[arg(required = true)]
    input: PathBuf,

    /// Target language (e.g. "vi")
    #[arg(long, required = true)]
    to: LanguageCode,

    /// Output text file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: TranslateArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let text = read_input_text(&args.input, &config).await?;

    let translator = GoogleTranslator::new(config.translation.clone())?;
    let pb = spinner(format!("Translating to {}", args.to));
    let result = translator.translate(&text, &args.to).await;
    pb.finish_and_clear();
    let translated = result?;

    match &args.output {
        Some(path) => {
            save_text(&translated, path)?;
            eprintln!("{} Translation written to {}", style("✓").green(), path.display());
        }
        None => println!("{}", translated),
    }

    Ok(())
}
