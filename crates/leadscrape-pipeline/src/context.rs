//! Per-run observability context.
//!
//! A [`RunContext`] is created once per pipeline run and threaded through the
//! driver. Stage timings and quality alerts land here; the validators, the
//! scorer, and the deduplicator never see it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageTiming {
    pub stage: &'static str,
    pub records_in: usize,
    pub records_out: usize,
    pub elapsed_ms: u64,
}

/// Raised when a batch's dataset-level quality score falls below the
/// configured alert threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityAlert {
    pub source: String,
    pub quality_score: f64,
    pub threshold: f64,
    pub raised_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunContext {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub stages: Vec<StageTiming>,
    pub alerts: Vec<QualityAlert>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RunContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            stages: Vec::new(),
            alerts: Vec::new(),
        }
    }

    pub fn record_stage(
        &mut self,
        stage: &'static str,
        records_in: usize,
        records_out: usize,
        elapsed: Duration,
    ) {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        tracing::debug!(
            run_id = %self.run_id,
            stage,
            records_in,
            records_out,
            elapsed_ms,
            "pipeline stage complete"
        );
        self.stages.push(StageTiming {
            stage,
            records_in,
            records_out,
            elapsed_ms,
        });
    }

    pub fn raise_alert(&mut self, source: &str, quality_score: f64, threshold: f64) {
        tracing::warn!(
            run_id = %self.run_id,
            source,
            quality_score,
            threshold,
            "data quality below alert threshold"
        );
        self.alerts.push(QualityAlert {
            source: source.to_string(),
            quality_score,
            threshold,
            raised_at: Utc::now(),
        });
    }

    #[must_use]
    pub fn stage(&self, name: &str) -> Option<&StageTiming> {
        self.stages.iter().find(|s| s.stage == name)
    }
}
