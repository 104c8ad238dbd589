//! Lead pipeline orchestration.

use std::time::Instant;

use chrono::Utc;
use leadscrape_core::{fields, Dataset, PipelineConfig};
use leadscrape_validate::{QualityAssessment, QualityMonitor, ValidationProcessor};

use crate::clean::{clean_dataset, drop_missing_identity};
use crate::context::RunContext;
use crate::error::{ExportFailure, PipelineError};
use crate::export::{ExportReceipt, Exporter};

/// Everything one run produced. The processed data is always present; an
/// export problem shows up in `export_error` instead of failing the run.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub data: Dataset,
    pub assessment: QualityAssessment,
    pub context: RunContext,
    pub export: Option<ExportReceipt>,
    pub export_error: Option<ExportFailure>,
}

pub struct LeadPipeline {
    config: PipelineConfig,
    monitor: QualityMonitor,
    exporter: Option<Box<dyn Exporter>>,
}

impl std::fmt::Debug for LeadPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeadPipeline")
            .field("config", &self.config)
            .field("monitor", &self.monitor)
            .field("exporter", &self.exporter.as_ref().map(|e| e.name()))
            .finish()
    }
}

impl LeadPipeline {
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] when `config` fails validation.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            config,
            monitor: QualityMonitor::with_defaults()?,
            exporter: None,
        })
    }

    /// Replace the default quality monitor (custom rules, or one whose
    /// history should carry across pipelines).
    #[must_use]
    pub fn with_monitor(mut self, monitor: QualityMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    #[must_use]
    pub fn with_exporter(mut self, exporter: impl Exporter + 'static) -> Self {
        self.exporter = Some(Box::new(exporter));
        self
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[must_use]
    pub fn monitor(&self) -> &QualityMonitor {
        &self.monitor
    }

    /// Run one batch from `source` through the pipeline.
    ///
    /// 1. Clean: trim strings, drop empty and fully repeated rows.
    /// 2. Drop rows without a `business_name`.
    /// 3. Deduplicate and validate in one orchestrator pass.
    /// 4. Assess dataset quality; a score under the alert threshold raises a
    ///    [`QualityAlert`](crate::QualityAlert) but never stops the run.
    /// 5. Filter by `validation.min_data_quality` when it is non-zero.
    /// 6. Stamp `processed_at`.
    /// 7. Hand off to the exporter, if one is attached.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Validation`] when the deduplication settings
    /// reference columns the data does not have.
    pub fn run(&mut self, data: Dataset, source: &str) -> Result<PipelineOutcome, PipelineError> {
        let mut ctx = RunContext::new();
        tracing::info!(run_id = %ctx.run_id, source, records = data.len(), "pipeline run started");

        let mut data = data;
        let started = Instant::now();
        let before = data.len();
        clean_dataset(&mut data);
        ctx.record_stage("clean", before, data.len(), started.elapsed());

        let started = Instant::now();
        let before = data.len();
        let dropped = drop_missing_identity(&mut data);
        if dropped > 0 {
            tracing::warn!(dropped, "records without business_name dropped");
        }
        ctx.record_stage("identity", before, data.len(), started.elapsed());

        let started = Instant::now();
        let before = data.len();
        let processor =
            ValidationProcessor::new(data).with_config(self.config.validation.clone());
        let processed = if processor.data().is_empty() {
            processor.process()
        } else {
            processor.process_with(&self.config.deduplication)?
        };
        ctx.record_stage("validate", before, processed.len(), started.elapsed());

        let started = Instant::now();
        let assessment = self.monitor.assess(&processed, source);
        if assessment.quality_score < self.config.quality_alert_threshold {
            ctx.raise_alert(
                source,
                assessment.quality_score,
                self.config.quality_alert_threshold,
            );
        }
        ctx.record_stage("assess", processed.len(), processed.len(), started.elapsed());

        let started = Instant::now();
        let before = processed.len();
        let threshold = self.config.validation.min_data_quality;
        let mut data = if threshold.is_enabled() {
            ValidationProcessor::new(processed).filter_by_threshold(threshold)
        } else {
            processed
        };
        ctx.record_stage("filter", before, data.len(), started.elapsed());

        let processed_at = Utc::now().to_rfc3339();
        data.update_records(|record| record.set(fields::PROCESSED_AT, processed_at.clone()));

        let mut export = None;
        let mut export_error = None;
        if let Some(exporter) = &self.exporter {
            let started = Instant::now();
            match exporter.export(&data) {
                Ok(receipt) => export = Some(receipt),
                Err(e) => {
                    tracing::error!(
                        run_id = %ctx.run_id,
                        exporter = exporter.name(),
                        error = %e,
                        "export failed; returning processed data"
                    );
                    export_error = Some(ExportFailure::new(exporter.name(), &e));
                }
            }
            ctx.record_stage("export", data.len(), data.len(), started.elapsed());
        }

        tracing::info!(
            run_id = %ctx.run_id,
            source,
            records = data.len(),
            quality_score = assessment.quality_score,
            alerts = ctx.alerts.len(),
            "pipeline run complete"
        );

        Ok(PipelineOutcome {
            data,
            assessment,
            context: ctx,
            export,
            export_error,
        })
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
