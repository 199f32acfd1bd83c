//! CLI binary for doc-skills.
//!
//! A thin shim over the library crate: maps flags to `SkillConfig`, runs one
//! skill, and prints its record as JSON on stdout. Logs and the spinner go to
//! stderr so stdout can be piped straight into the next skill.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doc_skills::{
    classify, classify_batch, extract_driver_license, extract_insurance, validate_json,
    verify_pair, SkillConfig,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Which kind of document is this?
  doc-skills classify scan_0412.jpg

  # Classify a folder, four calls in flight
  doc-skills classify --concurrency 4 scans/*.pdf

  # Extract fields
  doc-skills extract-dl license.jpg > dl.json
  doc-skills extract-insurance card.pdf > ins.json

  # Cross-check the two records (JSON text or @file)
  doc-skills validate @dl.json @ins.json

  # Everything at once, files in any order
  doc-skills verify card.pdf license.jpg

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key (default backend, JSON mode)
  OPENAI_BASE_URL         OpenAI-compatible endpoint override
  ANTHROPIC_API_KEY       Anthropic API key (via --provider anthropic)
  GEMINI_API_KEY          Google Gemini API key (via --provider gemini)
  EDGEQUAKE_LLM_PROVIDER  Provider override when paired with EDGEQUAKE_MODEL
  EDGEQUAKE_MODEL         Model override when paired with EDGEQUAKE_LLM_PROVIDER
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory) for PDF input

  A .env file in the working directory is loaded first.
"#;

/// Classify, extract and cross-check driver licenses and insurance cards.
#[derive(Parser, Debug)]
#[command(
    name = "doc-skills",
    version,
    about = "Classify, extract and cross-check driver licenses and insurance cards with Vision LLMs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Vision model ID (default: gpt-4o-mini).
    #[arg(long, global = true, env = "DOC_SKILLS_MODEL")]
    model: Option<String>,

    /// Provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, global = true, env = "DOC_SKILLS_PROVIDER")]
    provider: Option<String>,

    /// Sampling temperature (0.0–2.0). Provider default when unset.
    #[arg(long, global = true, env = "DOC_SKILLS_TEMPERATURE")]
    temperature: Option<f32>,

    /// Do not rotate portrait scans to landscape.
    #[arg(long, global = true, env = "DOC_SKILLS_NO_AUTO_ROTATE")]
    no_auto_rotate: bool,

    /// Parallel model calls when classifying several files.
    #[arg(long, global = true, env = "DOC_SKILLS_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// HTTP timeout for model calls, in seconds.
    #[arg(long, global = true, env = "DOC_SKILLS_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Print single-line JSON instead of pretty JSON.
    #[arg(long, global = true)]
    compact: bool,

    /// Disable the spinner.
    #[arg(long, global = true, env = "DOC_SKILLS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOC_SKILLS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOC_SKILLS_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify documents as driver_license, insurance or unknown.
    Classify {
        /// PDF, JPEG or PNG files.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Extract fields from a driver license.
    ExtractDl { file: PathBuf },
    /// Extract fields from an insurance document.
    ExtractInsurance { file: PathBuf },
    /// Compare a driver-license record with an insurance record.
    Validate {
        /// DriverLicenseData JSON, or @path to a JSON file.
        dl_json: String,
        /// InsuranceData JSON, or @path to a JSON file.
        insurance_json: String,
    },
    /// Classify two files, extract both, and validate them against each other.
    Verify { first: PathBuf, second: PathBuf },
}

/// Batch output row: either the classification or the error text.
#[derive(Serialize)]
#[serde(untagged)]
enum BatchRow {
    Ok(doc_skills::ClassificationResult),
    Failed { file_path: String, error: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in .env; missing file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Validate {
            ref dl_json,
            ref insurance_json,
        } => {
            let dl = read_json_arg(dl_json).await?;
            let ins = read_json_arg(insurance_json).await?;
            let report = validate_json(&dl, &ins).context("Validation failed")?;
            print_json(&report, cli.compact)
        }
        Command::Classify { ref files } => {
            let config = build_config(&cli)?;
            if let [file] = files.as_slice() {
                let spinner = spinner(show_progress, "Classifying");
                let result = classify(file, &config).await;
                spinner.finish_and_clear();
                print_json(&result.context("Classification failed")?, cli.compact)
            } else {
                let spinner = spinner(
                    show_progress,
                    &format!("Classifying {} documents", files.len()),
                );
                let results = classify_batch(files, &config).await;
                spinner.finish_and_clear();
                let rows: Vec<BatchRow> = results
                    .context("Batch classification failed")?
                    .into_iter()
                    .map(|(file_path, outcome)| match outcome {
                        Ok(r) => BatchRow::Ok(r),
                        Err(e) => BatchRow::Failed {
                            file_path,
                            error: e.to_string(),
                        },
                    })
                    .collect();
                print_json(&rows, cli.compact)
            }
        }
        Command::ExtractDl { ref file } => {
            let config = build_config(&cli)?;
            let spinner = spinner(show_progress, "Extracting driver license");
            let result = extract_driver_license(file, &config).await;
            spinner.finish_and_clear();
            print_json(&result.context("Driver license extraction failed")?, cli.compact)
        }
        Command::ExtractInsurance { ref file } => {
            let config = build_config(&cli)?;
            let spinner = spinner(show_progress, "Extracting insurance");
            let result = extract_insurance(file, &config).await;
            spinner.finish_and_clear();
            print_json(&result.context("Insurance extraction failed")?, cli.compact)
        }
        Command::Verify {
            ref first,
            ref second,
        } => {
            let config = build_config(&cli)?;
            let spinner = spinner(show_progress, "Verifying document pair");
            let result = verify_pair(first, second, &config).await;
            spinner.finish_and_clear();
            print_json(&result.context("Verification failed")?, cli.compact)
        }
    }
}

/// Map CLI args to `SkillConfig`. The vision model is resolved by each skill
/// after its input has been checked.
fn build_config(cli: &Cli) -> Result<SkillConfig> {
    let mut builder = SkillConfig::builder()
        .auto_rotate(!cli.no_auto_rotate)
        .concurrency(cli.concurrency)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref m) = cli.model {
        builder = builder.model(m);
    }
    if let Some(ref p) = cli.provider {
        builder = builder.provider_name(p);
    }
    if let Some(t) = cli.temperature {
        builder = builder.temperature(t);
    }

    builder.build().context("Invalid configuration")
}

/// `@path` reads the file; anything else is taken as JSON text.
async fn read_json_arg(arg: &str) -> Result<String> {
    match arg.strip_prefix('@') {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read JSON from {:?}", path)),
        None => Ok(arg.to_string()),
    }
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let json = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
    .context("Failed to serialise output")?;
    println!("{json}");
    Ok(())
}

fn spinner(enabled: bool, message: &str) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}
