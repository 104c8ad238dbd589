//! Assessment, history, and report types for the quality monitor.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use leadscrape_core::Record;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingRequired,
    InvalidFormat,
    DuplicateRecord,
    SuspiciousPattern,
    Anomaly,
    EmptyDataset,
}

impl IssueKind {
    /// Score penalty per issue, scaled by the issue's share of records.
    #[must_use]
    pub fn penalty_weight(self) -> f64 {
        match self {
            Self::MissingRequired => 10.0,
            Self::InvalidFormat => 8.0,
            Self::DuplicateRecord => 5.0,
            Self::SuspiciousPattern => 4.0,
            Self::Anomaly => 2.0,
            Self::EmptyDataset => 0.0,
        }
    }
}

/// One finding. Per-record issues carry `record_index`; aggregate issues
/// carry `count` and `percentage` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_index: Option<usize>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Fraction of records (0–1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl QualityIssue {
    pub(crate) fn record(
        kind: IssueKind,
        field: Option<&str>,
        record_index: usize,
        description: String,
    ) -> Self {
        Self {
            kind,
            field: field.map(str::to_string),
            record_index: Some(record_index),
            description,
            count: None,
            percentage: None,
            pattern: None,
            value: None,
        }
    }

    pub(crate) fn aggregate(
        kind: IssueKind,
        field: Option<&str>,
        count: usize,
        percentage: f64,
        description: String,
    ) -> Self {
        Self {
            kind,
            field: field.map(str::to_string),
            record_index: None,
            description,
            count: Some(count),
            percentage: Some(percentage),
            pattern: None,
            value: None,
        }
    }

    #[must_use]
    pub fn is_aggregate(&self) -> bool {
        self.record_index.is_none()
    }
}

/// Result of assessing one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub records_processed: usize,
    pub records_with_issues: usize,
    /// Penalty-based overall score, 0–100.
    pub quality_score: f64,
    /// Share of required-field cells that are filled, 0–100.
    pub completeness: f64,
    /// Share of checked, non-missing cells that pass their field rule, 0–100.
    pub validity: f64,
    pub issues: Vec<QualityIssue>,
    pub field_issues: BTreeMap<String, usize>,
    pub issue_types: BTreeMap<IssueKind, usize>,
    pub suspicious_records: Vec<Record>,
}

/// One history point per assessed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub quality_score: f64,
    pub records_processed: usize,
    pub records_with_issues: usize,
}

/// Totals across every assessment made by one monitor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityStatistics {
    pub total_records_processed: usize,
    pub records_with_issues: usize,
    pub fields_with_issues: BTreeMap<String, usize>,
    pub issue_types: BTreeMap<IssueKind, usize>,
    pub last_processing_time: Option<DateTime<Utc>>,
    /// Score of the most recent non-empty assessment.
    pub quality_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub timestamp: DateTime<Utc>,
    pub total_records_processed: usize,
    pub total_records_with_issues: usize,
    pub overall_quality_score: f64,
    pub issue_summary: BTreeMap<IssueKind, usize>,
    pub field_issues: BTreeMap<String, usize>,
    pub history: BTreeMap<String, Vec<HistoryEntry>>,
    /// Newest minus oldest score, for sources with at least two entries.
    pub trends: BTreeMap<String, f64>,
}
