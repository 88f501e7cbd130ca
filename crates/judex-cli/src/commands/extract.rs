//! Extract command - run a batch and export the result table.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use judex_core::batch::{BatchObserver, BatchOrchestrator};
use judex_core::models::{DocumentFormat, ExportFormat, ExtractedRecord, Field, FAILURE_CAUSE_PREFIX, SUPPORTED_EXTENSIONS};
use judex_core::{Dispatcher, Exporter, LlmFieldExtractor, OpenAiCompatibleBackend};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// API key for the language-model backend
    #[arg(long, env = "JUDEX_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Output directory (default: desktop)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Model identifier
    #[arg(long)]
    model: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long)]
    base_url: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// CSV with a UTF-8 byte order mark
    Csv,
    /// JSON array of records
    Json,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => ExportFormat::Csv,
            OutputFormat::Json => ExportFormat::Json,
        }
    }
}

/// Prints one line per finished file above the progress bar.
struct ProgressObserver {
    pb: ProgressBar,
}

impl BatchObserver for ProgressObserver {
    fn on_file_started(&self, _index: usize, _total: usize, name: &str) {
        self.pb.set_message(name.to_string());
    }

    fn on_file_finished(&self, _index: usize, _total: usize, record: &ExtractedRecord) {
        if record.is_failure() {
            let cause = record
                .fields
                .get(Field::Title)
                .trim_start_matches(FAILURE_CAUSE_PREFIX);
            self.pb.suspend(|| {
                println!("{} {} {}", style("✗").red(), record.filename, style(cause).dim())
            });
        } else {
            let case_number = record.fields.get(Field::CaseNumber);
            self.pb.suspend(|| {
                println!("{} {} {}", style("✓").green(), record.filename, style(case_number).dim())
            });
        }
        self.pb.inc(1);
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = super::load_config(config_path)?;
    if let Some(model) = args.model {
        config.llm.model = model;
    }
    if let Some(base_url) = args.base_url {
        config.llm.base_url = base_url;
    }
    if let Some(format) = args.format {
        config.export.format = format.into();
    }

    let api_key = match args.api_key.filter(|k| !k.trim().is_empty()) {
        Some(key) => key,
        None => anyhow::bail!("No API key given. Pass --api-key or set JUDEX_API_KEY."),
    };

    let files = expand_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for: {}", args.inputs.join(" "));
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let output_dir = args
        .output_dir
        .or_else(|| config.export.output_dir.clone())
        .or_else(dirs::desktop_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    debug!("Output directory: {}", output_dir.display());

    if files.iter().any(|f| needs_ocr(f)) {
        super::check_ocr(&config.ocr);
    }

    let backend = OpenAiCompatibleBackend::new(&config.llm, api_key)?;
    let extractor = LlmFieldExtractor::new(backend, &config.llm);
    let dispatcher = Dispatcher::from_config(&config.ocr);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let mut orchestrator = BatchOrchestrator::new(dispatcher, Box::new(extractor), config.batch.clone())
        .with_observer(Box::new(ProgressObserver { pb: pb.clone() }));

    let summary = orchestrator.run_paths(&files).await;
    pb.finish_and_clear();

    let exporter = Exporter::new(&output_dir, &config.export);
    let output_path = exporter.export(orchestrator.results())?;

    println!();
    println!(
        "{} Processed {} files in {:.1}s",
        style("✓").green(),
        summary.total,
        start.elapsed().as_secs_f64()
    );
    println!("  Succeeded: {}", style(summary.succeeded).green());
    if summary.failed > 0 {
        println!("  Failed:    {}", style(summary.failed).red());
    }
    println!(
        "{} Results written to {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

/// Resolve paths and glob patterns into files, keeping argument order.
///
/// Only glob matches are filtered by extension; explicitly named files are
/// passed through so unsupported ones show up as failure records.
fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if Path::new(input).exists() || !is_pattern(input) {
            files.push(PathBuf::from(input));
            continue;
        }

        let mut matches: Vec<PathBuf> = glob(input)?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file() && is_supported(p))
            .collect();
        if matches.is_empty() {
            warn!("Pattern matched no supported files: {}", input);
        }
        matches.sort();
        files.extend(matches);
    }

    Ok(files)
}

fn is_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

/// Images always go through OCR and PDFs may.
fn needs_ocr(path: &Path) -> bool {
    DocumentFormat::from_filename(&path.to_string_lossy())
        .map(|f| f.is_image() || f == DocumentFormat::Pdf)
        .unwrap_or(false)
}

fn is_supported(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    SUPPORTED_EXTENSIONS.contains(&ext.as_str())
}
