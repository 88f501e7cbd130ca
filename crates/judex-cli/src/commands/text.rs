//! Text command - show the text a file yields before field extraction.

use std::path::PathBuf;

use clap::Args;
use console::style;

use judex_core::Dispatcher;
use judex_core::models::DocumentFormat;

/// Arguments for the text command.
#[derive(Args)]
pub struct TextArgs {
    /// Input file (DOCX, PDF, TXT, JPG, PNG or BMP)
    #[arg(required = true)]
    input: PathBuf,
}

pub fn run(args: TextArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let format = DocumentFormat::from_filename(&args.input.to_string_lossy())?;
    if format.is_image() || format == DocumentFormat::Pdf {
        super::check_ocr(&config.ocr);
    }

    let dispatcher = Dispatcher::from_config(&config.ocr);
    let raw = dispatcher.dispatch_file(&args.input)?;

    // Provenance on stderr, text on stdout.
    eprintln!(
        "{} {} ({}, {})",
        style("ℹ").blue(),
        args.input.display(),
        raw.source,
        if raw.ocr_used { "OCR" } else { "text layer" }
    );
    if let Some(pages) = raw.page_count {
        eprintln!("  {} pages recognized", pages);
    }

    println!("{}", raw.text);

    Ok(())
}
