mod check;
mod dedupe;
mod process;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use leadscrape_core::{load_pipeline_config, Dataset};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "leadscrape-cli")]
#[command(about = "Validate, score, and deduplicate scraped business leads")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the full pipeline over a JSON array of records
    Process {
        /// Input file: a JSON array of objects
        #[arg(long)]
        input: PathBuf,
        /// Write the processed records here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Source label used for quality history and alerts
        #[arg(long, default_value = "cli")]
        source: String,
        /// Directory for the data quality JSON report
        #[arg(long)]
        report_dir: Option<PathBuf>,
        /// Export the processed rows as a timestamped JSON file in this directory
        #[arg(long)]
        export_dir: Option<PathBuf>,
        /// YAML configuration; `LEADSCRAPE_*` env vars are used otherwise
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Deduplicate a JSON array of records with the blocked large-dataset mode
    Dedupe {
        /// Input file: a JSON array of objects
        #[arg(long)]
        input: PathBuf,
        /// Match fields; the first is fuzzy-compared
        #[arg(long, value_delimiter = ',', required = true)]
        fields: Vec<String>,
        /// Similarity threshold, 0-100
        #[arg(long, default_value_t = 80.0)]
        threshold: f64,
        /// Compare blocks on the rayon thread pool
        #[arg(long)]
        parallel: bool,
        /// Write the surviving records here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate and format a single email address
    CheckEmail { value: String },
    /// Validate and format a single phone number
    CheckPhone {
        value: String,
        /// ISO 3166-1 alpha-2 country code, e.g. MX
        #[arg(long)]
        country: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = match &cli.command {
        Commands::Process { config, .. } => process::load_settings(config.as_deref())?,
        _ => load_pipeline_config()?,
    };
    init_tracing(&settings.log_level)?;

    match cli.command {
        Commands::Process {
            input,
            output,
            source,
            report_dir,
            export_dir,
            config,
        } => process::run_process(
            &process::ProcessArgs {
                input,
                output,
                source,
                report_dir,
                export_dir,
                config,
            },
            settings,
        ),
        Commands::Dedupe {
            input,
            fields,
            threshold,
            parallel,
            output,
        } => dedupe::run_dedupe(&input, fields, threshold, parallel, output.as_deref()),
        Commands::CheckEmail { value } => check::run_check_email(&value),
        Commands::CheckPhone { value, country } => {
            check::run_check_phone(&value, country.as_deref())
        }
    }
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Read a JSON array of records from `path`.
fn read_dataset(path: &Path) -> anyhow::Result<Dataset> {
    let input = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Dataset::from_json_str(&input)
        .with_context(|| format!("{} is not a JSON array of records", path.display()))
}

/// Pretty-print `value` to `path`, or to stdout when no path is given.
fn write_json(value: &serde_json::Value, path: Option<&Path>) -> anyhow::Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => std::fs::write(path, body)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{body}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests;
