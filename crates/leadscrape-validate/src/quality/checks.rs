//! Individual dataset checks. Each returns per-record issues plus, where the
//! configured threshold is crossed, an aggregate issue for the field.

use std::collections::{HashMap, HashSet};

use leadscrape_core::{Dataset, Record};
use regex::{Regex, RegexBuilder};
use serde_json::Value;

use super::config::{AnomalyDetection, QualityConfig};
use super::types::{IssueKind, QualityIssue};
use crate::ValidationError;

/// Fields never scanned for suspicious patterns.
const PATTERN_EXEMPT_FIELDS: &[&str] = &["description", "address"];

pub(super) struct CompiledField {
    pub name: String,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
}

impl CompiledField {
    fn has_format_rule(&self) -> bool {
        self.pattern.is_some() || self.min_length.is_some() || self.max_length.is_some()
    }

    fn accepts(&self, value: &str) -> bool {
        let len = value.chars().count();
        self.pattern.as_ref().is_none_or(|re| re.is_match(value))
            && self.min_length.is_none_or(|min| len >= min)
            && self.max_length.is_none_or(|max| len <= max)
    }
}

/// Field rules and suspicious patterns with their regexes compiled once.
pub(super) struct CompiledRules {
    pub fields: Vec<CompiledField>,
    pub suspicious: Vec<(String, Regex)>,
}

impl CompiledRules {
    pub fn new(config: &QualityConfig) -> Result<Self, ValidationError> {
        let mut fields = Vec::with_capacity(config.field_rules.len());
        for (name, rule) in &config.field_rules {
            let pattern = rule
                .pattern
                .as_deref()
                .map(|p| {
                    Regex::new(p).map_err(|source| ValidationError::InvalidPattern {
                        pattern: p.to_string(),
                        source,
                    })
                })
                .transpose()?;
            fields.push(CompiledField {
                name: name.clone(),
                required: rule.required,
                min_length: rule.min_length,
                max_length: rule.max_length,
                pattern,
            });
        }

        let mut suspicious = Vec::new();
        if config.pattern_detection.enabled {
            for p in &config.pattern_detection.suspicious_patterns {
                let re = RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| ValidationError::InvalidPattern {
                        pattern: p.clone(),
                        source,
                    })?;
                suspicious.push((p.clone(), re));
            }
        }
        Ok(Self { fields, suspicious })
    }
}

#[allow(clippy::cast_precision_loss)]
fn share(count: usize, total: usize) -> f64 {
    count as f64 / total as f64
}

/// Required fields that are null, absent, or blank.
pub(super) fn missing_values(
    data: &Dataset,
    rules: &CompiledRules,
    threshold: f64,
) -> Vec<QualityIssue> {
    let mut issues = Vec::new();
    for field in rules.fields.iter().filter(|f| f.required) {
        if !data.has_column(&field.name) {
            continue;
        }
        let missing: Vec<usize> = data
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_present(&field.name))
            .map(|(i, _)| i)
            .collect();
        if missing.is_empty() {
            continue;
        }
        let pct = share(missing.len(), data.len());
        if pct > threshold {
            issues.push(QualityIssue::aggregate(
                IssueKind::MissingRequired,
                Some(field.name.as_str()),
                missing.len(),
                pct,
                format!(
                    "{} missing in {} records ({:.1}%)",
                    field.name,
                    missing.len(),
                    pct * 100.0
                ),
            ));
        }
        issues.extend(missing.into_iter().map(|i| {
            QualityIssue::record(
                IssueKind::MissingRequired,
                Some(field.name.as_str()),
                i,
                format!("Required field {} is missing", field.name),
            )
        }));
    }
    issues
}

/// Present values failing their field's pattern or length bounds.
pub(super) fn invalid_formats(
    data: &Dataset,
    rules: &CompiledRules,
    threshold: f64,
) -> Vec<QualityIssue> {
    let mut issues = Vec::new();
    for field in rules.fields.iter().filter(|f| f.has_format_rule()) {
        if !data.has_column(&field.name) {
            continue;
        }
        let invalid: Vec<(usize, String)> = data
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.text(&field.name).map(|v| (i, v)))
            .filter(|(_, v)| !field.accepts(v))
            .collect();
        if invalid.is_empty() {
            continue;
        }
        let pct = share(invalid.len(), data.len());
        if pct > threshold {
            issues.push(QualityIssue::aggregate(
                IssueKind::InvalidFormat,
                Some(field.name.as_str()),
                invalid.len(),
                pct,
                format!(
                    "{} has invalid format in {} records ({:.1}%)",
                    field.name,
                    invalid.len(),
                    pct * 100.0
                ),
            ));
        }
        issues.extend(invalid.into_iter().map(|(i, value)| {
            QualityIssue::record(
                IssueKind::InvalidFormat,
                Some(field.name.as_str()),
                i,
                format!("Field {} has invalid format: '{value}'", field.name),
            )
        }));
    }
    issues
}

/// Present-value cells checked by a format rule and how many of them failed.
pub(super) fn format_counts(data: &Dataset, rules: &CompiledRules) -> (usize, usize) {
    let mut checked = 0;
    let mut failed = 0;
    for field in rules.fields.iter().filter(|f| f.has_format_rule()) {
        for value in data.iter().filter_map(|r| r.text(&field.name)) {
            checked += 1;
            if !field.accepts(&value) {
                failed += 1;
            }
        }
    }
    (checked, failed)
}

/// Filled and expected cell counts across required fields in the dataset.
pub(super) fn completeness_counts(data: &Dataset, rules: &CompiledRules) -> (usize, usize) {
    let required: Vec<&str> = rules
        .fields
        .iter()
        .filter(|f| f.required && data.has_column(&f.name))
        .map(|f| f.name.as_str())
        .collect();
    let filled = data
        .iter()
        .map(|r| required.iter().filter(|f| r.is_present(f)).count())
        .sum();
    (filled, required.len() * data.len())
}

/// Records repeating an earlier record on the required fields (all columns
/// when no required field is in the dataset).
pub(super) fn duplicates(
    data: &Dataset,
    rules: &CompiledRules,
    threshold: f64,
) -> Vec<QualityIssue> {
    let mut key_fields: Vec<&str> = data
        .columns()
        .iter()
        .map(String::as_str)
        .filter(|c| rules.fields.iter().any(|f| f.required && f.name == *c))
        .collect();
    if key_fields.is_empty() {
        key_fields = data.columns().iter().map(String::as_str).collect();
    }
    if key_fields.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let duplicate_rows: Vec<usize> = data
        .iter()
        .enumerate()
        .filter(|(_, r)| !seen.insert(row_key(r, &key_fields)))
        .map(|(i, _)| i)
        .collect();
    if duplicate_rows.is_empty() {
        return Vec::new();
    }

    let mut issues = Vec::new();
    let pct = share(duplicate_rows.len(), data.len());
    if pct > threshold {
        issues.push(QualityIssue::aggregate(
            IssueKind::DuplicateRecord,
            None,
            duplicate_rows.len(),
            pct,
            format!(
                "Found {} duplicate records ({:.1}%)",
                duplicate_rows.len(),
                pct * 100.0
            ),
        ));
    }
    let joined = key_fields.join(", ");
    issues.extend(duplicate_rows.into_iter().map(|i| {
        QualityIssue::record(
            IssueKind::DuplicateRecord,
            None,
            i,
            format!("Record is a duplicate based on key fields: {joined}"),
        )
    }));
    issues
}

fn row_key(record: &Record, key_fields: &[&str]) -> String {
    Value::Array(
        key_fields
            .iter()
            .map(|f| record.get(f).cloned().unwrap_or(Value::Null))
            .collect(),
    )
    .to_string()
}

/// Pattern hits per (field, pattern), plus one aggregate per field with
/// any hit. Returns the issues and the sorted indices of flagged records.
pub(super) fn suspicious_patterns(
    data: &Dataset,
    rules: &CompiledRules,
) -> (Vec<QualityIssue>, Vec<usize>) {
    let mut issues = Vec::new();
    let mut flagged = HashSet::new();
    for field in &rules.fields {
        if !data.has_column(&field.name) || PATTERN_EXEMPT_FIELDS.contains(&field.name.as_str()) {
            continue;
        }
        let mut hits = 0;
        for (pattern, re) in &rules.suspicious {
            for (i, record) in data.iter().enumerate() {
                let Some(value) = record.text(&field.name) else {
                    continue;
                };
                if !re.is_match(&value) {
                    continue;
                }
                hits += 1;
                flagged.insert(i);
                let mut issue = QualityIssue::record(
                    IssueKind::SuspiciousPattern,
                    Some(field.name.as_str()),
                    i,
                    format!(
                        "Field {} contains suspicious pattern: '{pattern}'",
                        field.name
                    ),
                );
                issue.pattern = Some(pattern.clone());
                issues.push(issue);
            }
        }
        if hits > 0 {
            let pct = share(hits, data.len());
            issues.push(QualityIssue::aggregate(
                IssueKind::SuspiciousPattern,
                Some(field.name.as_str()),
                hits,
                pct,
                format!(
                    "{} contains suspicious patterns in {hits} records ({:.1}%)",
                    field.name,
                    pct * 100.0
                ),
            ));
        }
    }
    let mut flagged: Vec<usize> = flagged.into_iter().collect();
    flagged.sort_unstable();
    (issues, flagged)
}

/// Numeric outliers (per-record and aggregate) and rare categorical values
/// (aggregate only).
pub(super) fn anomalies(data: &Dataset, config: &AnomalyDetection) -> Vec<QualityIssue> {
    if !config.enabled {
        return Vec::new();
    }
    let mut issues = Vec::new();
    for column in data.columns() {
        match column_kind(data, column) {
            ColumnKind::Numeric(values) => {
                numeric_outliers(data, column, &values, config.std_dev_threshold, &mut issues);
            }
            ColumnKind::Categorical => rare_categories(
                data,
                column,
                config.categorical_frequency_threshold,
                &mut issues,
            ),
            ColumnKind::Other => {}
        }
    }
    issues
}

enum ColumnKind {
    /// `(record index, value)` for every non-null cell.
    Numeric(Vec<(usize, f64)>),
    Categorical,
    Other,
}

/// A column is numeric when every non-null cell is a JSON number, and
/// categorical when any non-null cell is a string.
fn column_kind(data: &Dataset, column: &str) -> ColumnKind {
    let mut numbers = Vec::new();
    let mut has_string = false;
    let mut all_numeric = true;
    let mut any = false;
    for (i, record) in data.iter().enumerate() {
        match record.get(column) {
            None => {}
            Some(Value::Number(n)) => {
                any = true;
                if let Some(v) = n.as_f64() {
                    numbers.push((i, v));
                }
            }
            Some(Value::String(_)) => {
                any = true;
                has_string = true;
                all_numeric = false;
            }
            Some(_) => {
                any = true;
                all_numeric = false;
            }
        }
    }
    if !any {
        ColumnKind::Other
    } else if all_numeric {
        ColumnKind::Numeric(numbers)
    } else if has_string {
        ColumnKind::Categorical
    } else {
        ColumnKind::Other
    }
}

#[allow(clippy::cast_precision_loss)]
fn numeric_outliers(
    data: &Dataset,
    column: &str,
    values: &[(usize, f64)],
    std_dev_threshold: f64,
    issues: &mut Vec<QualityIssue>,
) {
    if values.len() < 2 {
        return;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|(_, v)| v).sum::<f64>() / n;
    let variance = values.iter().map(|(_, v)| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = variance.sqrt();
    if std.is_nan() || std <= 0.0 {
        return;
    }
    let lower = mean - std_dev_threshold * std;
    let upper = mean + std_dev_threshold * std;
    let outliers: Vec<(usize, f64)> = values
        .iter()
        .copied()
        .filter(|(_, v)| *v < lower || *v > upper)
        .collect();
    if outliers.is_empty() {
        return;
    }

    let pct = share(outliers.len(), data.len());
    issues.push(QualityIssue::aggregate(
        IssueKind::Anomaly,
        Some(column),
        outliers.len(),
        pct,
        format!(
            "{column} has {} outliers ({:.1}%)",
            outliers.len(),
            pct * 100.0
        ),
    ));
    issues.extend(outliers.into_iter().map(|(i, value)| {
        let mut issue = QualityIssue::record(
            IssueKind::Anomaly,
            Some(column),
            i,
            format!("Field {column} has outlier value: {value} (outside range {lower:.2}-{upper:.2})"),
        );
        issue.value = Some(value);
        issue
    }));
}

fn rare_categories(
    data: &Dataset,
    column: &str,
    frequency_threshold: f64,
    issues: &mut Vec<QualityIssue>,
) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut total = 0;
    for value in data.iter().filter_map(|r| r.get(column)) {
        total += 1;
        *counts.entry(category(value)).or_default() += 1;
    }
    if total == 0 {
        return;
    }
    let rare_count: usize = counts
        .values()
        .filter(|&&c| share(c, total) < frequency_threshold)
        .sum();
    if rare_count == 0 {
        return;
    }
    let pct = share(rare_count, data.len());
    issues.push(QualityIssue::aggregate(
        IssueKind::Anomaly,
        Some(column),
        rare_count,
        pct,
        format!(
            "{column} has {rare_count} rare category values ({:.1}%)",
            pct * 100.0
        ),
    ));
}

fn category(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
