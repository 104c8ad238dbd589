//! Dataset-level quality monitoring.
//!
//! Where the per-record scorer rates one lead, the [`QualityMonitor`] rates a
//! whole batch: missing required fields, malformed values, duplicate rows,
//! suspicious patterns, and statistical anomalies become structured
//! [`QualityIssue`]s, folded into a penalty-based 0–100 score. The monitor
//! keeps a bounded per-source history and cumulative statistics across
//! batches, and can write a JSON report.

mod checks;
pub mod config;
mod types;

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use leadscrape_core::Dataset;

pub use config::{AnomalyDetection, FieldRule, PatternDetection, QualityConfig};
pub use types::{
    HistoryEntry, IssueKind, QualityAssessment, QualityIssue, QualityReport, QualityStatistics,
};

use checks::CompiledRules;

use crate::ValidationError;

/// Entries kept per source.
pub const HISTORY_LIMIT: usize = 100;

/// Maximum points taken off for the share of records with any issue.
const RECORDS_WITH_ISSUES_PENALTY: f64 = 20.0;

pub struct QualityMonitor {
    config: QualityConfig,
    rules: CompiledRules,
    history: HashMap<String, VecDeque<HistoryEntry>>,
    statistics: QualityStatistics,
}

impl std::fmt::Debug for QualityMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QualityMonitor")
            .field("config", &self.config)
            .field("sources", &self.history.len())
            .field("statistics", &self.statistics)
            .finish_non_exhaustive()
    }
}

impl QualityMonitor {
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPattern`] if a field or suspicious
    /// pattern does not compile.
    pub fn new(config: QualityConfig) -> Result<Self, ValidationError> {
        let rules = CompiledRules::new(&config)?;
        Ok(Self {
            config,
            rules,
            history: HashMap::new(),
            statistics: QualityStatistics::default(),
        })
    }

    /// Monitor with the built-in rules.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in patterns; the `Result` mirrors
    /// [`QualityMonitor::new`].
    pub fn with_defaults() -> Result<Self, ValidationError> {
        Self::new(QualityConfig::default())
    }

    #[must_use]
    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    #[must_use]
    pub fn statistics(&self) -> &QualityStatistics {
        &self.statistics
    }

    /// History for one source, oldest first.
    #[must_use]
    pub fn history(&self, source: &str) -> Vec<HistoryEntry> {
        self.history
            .get(source)
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Assess `data` and record the result under `source`.
    ///
    /// An empty dataset scores 0 with a single "Empty dataset" issue and
    /// leaves history and statistics untouched.
    pub fn assess(&mut self, data: &Dataset, source: &str) -> QualityAssessment {
        let started = Instant::now();
        let timestamp = Utc::now();

        if data.is_empty() {
            tracing::warn!(source, "empty dataset received for quality assessment");
            return QualityAssessment {
                source: source.to_string(),
                timestamp,
                records_processed: 0,
                records_with_issues: 0,
                quality_score: 0.0,
                completeness: 0.0,
                validity: 0.0,
                issues: vec![QualityIssue {
                    kind: IssueKind::EmptyDataset,
                    field: None,
                    record_index: None,
                    description: "Empty dataset".to_string(),
                    count: None,
                    percentage: None,
                    pattern: None,
                    value: None,
                }],
                field_issues: BTreeMap::new(),
                issue_types: BTreeMap::new(),
                suspicious_records: Vec::new(),
            };
        }

        let mut issues = checks::missing_values(data, &self.rules, self.config.missing_threshold);
        issues.extend(checks::invalid_formats(
            data,
            &self.rules,
            self.config.invalid_threshold,
        ));
        issues.extend(checks::duplicates(
            data,
            &self.rules,
            self.config.duplicate_threshold,
        ));
        let (suspicious_issues, suspicious_rows) = checks::suspicious_patterns(data, &self.rules);
        issues.extend(suspicious_issues);
        issues.extend(checks::anomalies(data, &self.config.anomaly_detection));

        let mut field_issues: BTreeMap<String, usize> = BTreeMap::new();
        let mut issue_types: BTreeMap<IssueKind, usize> = BTreeMap::new();
        for issue in &issues {
            if let Some(field) = &issue.field {
                *field_issues.entry(field.clone()).or_default() += 1;
            }
            *issue_types.entry(issue.kind).or_default() += 1;
        }
        let records_with_issues = issues
            .iter()
            .filter_map(|i| i.record_index)
            .collect::<BTreeSet<_>>()
            .len();

        let quality_score = penalty_score(&issue_types, records_with_issues, data.len());
        let (filled, expected) = checks::completeness_counts(data, &self.rules);
        let (checked, failed) = checks::format_counts(data, &self.rules);

        let assessment = QualityAssessment {
            source: source.to_string(),
            timestamp,
            records_processed: data.len(),
            records_with_issues,
            quality_score,
            completeness: percent_or_full(filled, expected),
            validity: percent_or_full(checked - failed, checked),
            issues,
            field_issues,
            issue_types,
            suspicious_records: suspicious_rows
                .iter()
                .filter_map(|&i| data.get(i).cloned())
                .collect(),
        };
        self.record(&assessment);

        tracing::info!(
            source,
            records = assessment.records_processed,
            records_with_issues,
            quality_score,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "data quality assessment complete"
        );
        assessment
    }

    fn record(&mut self, assessment: &QualityAssessment) {
        let stats = &mut self.statistics;
        stats.total_records_processed += assessment.records_processed;
        stats.records_with_issues += assessment.records_with_issues;
        stats.last_processing_time = Some(assessment.timestamp);
        stats.quality_score = Some(assessment.quality_score);
        for issue in &assessment.issues {
            let field = issue.field.clone().unwrap_or_else(|| "unknown".to_string());
            *stats.fields_with_issues.entry(field).or_default() += 1;
            *stats.issue_types.entry(issue.kind).or_default() += 1;
        }

        let entries = self
            .history
            .entry(assessment.source.clone())
            .or_default();
        entries.push_back(HistoryEntry {
            timestamp: assessment.timestamp,
            quality_score: assessment.quality_score,
            records_processed: assessment.records_processed,
            records_with_issues: assessment.records_with_issues,
        });
        while entries.len() > HISTORY_LIMIT {
            entries.pop_front();
        }
    }

    /// Cumulative report, restricted to one source's history when given.
    #[must_use]
    pub fn generate_report(&self, source: Option<&str>) -> QualityReport {
        let history: BTreeMap<String, Vec<HistoryEntry>> = match source {
            Some(source) => BTreeMap::from([(source.to_string(), self.history(source))]),
            None => self
                .history
                .iter()
                .map(|(name, entries)| (name.clone(), entries.iter().cloned().collect()))
                .collect(),
        };
        let trends = history
            .iter()
            .filter_map(|(name, entries)| match (entries.first(), entries.last()) {
                (Some(oldest), Some(newest)) if entries.len() >= 2 => {
                    Some((name.clone(), newest.quality_score - oldest.quality_score))
                }
                _ => None,
            })
            .collect();

        QualityReport {
            timestamp: Utc::now(),
            total_records_processed: self.statistics.total_records_processed,
            total_records_with_issues: self.statistics.records_with_issues,
            overall_quality_score: self.statistics.quality_score.unwrap_or(100.0),
            issue_summary: self.statistics.issue_types.clone(),
            field_issues: self.statistics.fields_with_issues.clone(),
            history,
            trends,
        }
    }

    /// Write [`generate_report`](Self::generate_report) as pretty JSON into
    /// `dir` (created if needed) and return the file path.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Io`] if the directory or file cannot be
    /// written and [`ValidationError::Json`] if serialization fails.
    pub fn export_report(
        &self,
        dir: &Path,
        source: Option<&str>,
    ) -> Result<PathBuf, ValidationError> {
        std::fs::create_dir_all(dir).map_err(|source| ValidationError::Io {
            path: dir.display().to_string(),
            source,
        })?;

        let report = self.generate_report(source);
        let stamp = report.timestamp.format("%Y%m%d_%H%M%S");
        let file_name = match source {
            Some(source) => format!("data_quality_{source}_{stamp}.json"),
            None => format!("data_quality_report_{stamp}.json"),
        };
        let path = dir.join(file_name);
        let body = serde_json::to_string_pretty(&report)?;
        std::fs::write(&path, body).map_err(|source| ValidationError::Io {
            path: path.display().to_string(),
            source,
        })?;

        tracing::info!(path = %path.display(), "data quality report exported");
        Ok(path)
    }
}

/// 100 minus, per issue kind, its count as a share of records times the
/// kind's weight times 100, minus up to 20 for the share of records with
/// any issue. Clamped to `[0, 100]`.
#[allow(clippy::cast_precision_loss)]
fn penalty_score(
    issue_types: &BTreeMap<IssueKind, usize>,
    records_with_issues: usize,
    records: usize,
) -> f64 {
    if records == 0 {
        return 0.0;
    }
    let records = records as f64;
    let mut score = 100.0;
    for (kind, &count) in issue_types {
        score -= count as f64 / records * kind.penalty_weight() * 100.0;
    }
    score -= records_with_issues as f64 / records * RECORDS_WITH_ISSUES_PENALTY;
    score.clamp(0.0, 100.0)
}

#[allow(clippy::cast_precision_loss)]
fn percent_or_full(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        100.0
    } else {
        crate::scorer::round2(part as f64 / whole as f64 * 100.0)
    }
}

#[cfg(test)]
#[path = "monitor_test.rs"]
mod tests;
