//! `process` command: the full lead pipeline over one input file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use leadscrape_core::{load_pipeline_config, load_pipeline_config_file, PipelineConfig};
use leadscrape_pipeline::{JsonFileExporter, LeadPipeline};
use leadscrape_validate::{QualityConfig, QualityMonitor};

use crate::{read_dataset, write_json};

#[derive(Debug)]
pub(crate) struct ProcessArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub source: String,
    pub report_dir: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Pipeline settings from the YAML file when one is given, otherwise from
/// `LEADSCRAPE_*` env vars.
pub(crate) fn load_settings(config: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    let settings = match config {
        Some(path) => load_pipeline_config_file(path)
            .with_context(|| format!("invalid config file {}", path.display()))?,
        None => load_pipeline_config()?,
    };
    Ok(settings)
}

/// Pipeline wired with the monitor rules from `config_file` and, when
/// `export_dir` is set, a JSON file exporter writing there.
pub(crate) fn build_pipeline(
    settings: PipelineConfig,
    config_file: Option<&Path>,
    export_dir: Option<&Path>,
) -> anyhow::Result<LeadPipeline> {
    let quality = match config_file {
        Some(path) => QualityConfig::from_yaml_file(path)?,
        None => QualityConfig::default(),
    };
    let mut pipeline = LeadPipeline::new(settings)?.with_monitor(QualityMonitor::new(quality)?);
    if let Some(dir) = export_dir {
        pipeline = pipeline.with_exporter(JsonFileExporter::new(dir));
    }
    Ok(pipeline)
}

pub(crate) fn run_process(args: &ProcessArgs, settings: PipelineConfig) -> anyhow::Result<()> {
    let mut pipeline = build_pipeline(
        settings,
        args.config.as_deref(),
        args.export_dir.as_deref(),
    )?;

    let data = read_dataset(&args.input)?;
    let outcome = pipeline
        .run(data, &args.source)
        .with_context(|| format!("pipeline failed for {}", args.input.display()))?;

    write_json(&outcome.data.to_json(), args.output.as_deref())?;

    if let Some(dir) = &args.report_dir {
        let path = pipeline
            .monitor()
            .export_report(dir, Some(args.source.as_str()))?;
        tracing::info!(path = %path.display(), "quality report written");
    }

    if let Some(receipt) = &outcome.export {
        tracing::info!(
            destination = %receipt.destination,
            rows = receipt.rows,
            "export written"
        );
    }
    if let Some(failure) = &outcome.export_error {
        tracing::warn!(
            exporter = %failure.exporter,
            error = %failure.message,
            "export failed; processed records were still written"
        );
    }

    tracing::info!(
        run_id = %outcome.context.run_id,
        records = outcome.data.len(),
        quality_score = outcome.assessment.quality_score,
        alerts = outcome.context.alerts.len(),
        "process complete"
    );
    Ok(())
}
