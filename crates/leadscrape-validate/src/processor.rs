//! Record validation orchestrator.
//!
//! [`ValidationProcessor`] runs the field validators, the suspicious-pattern
//! detector, and the quality scorer over every record and writes the derived
//! columns. It always works on a copy; the dataset it was built with is never
//! modified.

use std::collections::BTreeMap;

use leadscrape_core::{
    fields, Dataset, DeduplicationConfig, QualityThreshold, Record, ValidationConfig,
};
use leadscrape_dedupe::Deduplicator;
use serde::Serialize;
use serde_json::{json, Value};

use crate::countries::country_hint;
use crate::email::{format_email, validate_email};
use crate::phone::{format_phone_number, validate_phone_number};
use crate::quality::{QualityAssessment, QualityMonitor};
use crate::scorer::{calculate_quality_score, calculate_row_score, ScoreWeights};
use crate::suspicious::{detect_suspicious, SuspiciousFlags};
use crate::ValidationError;

/// Outcome of validating one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    /// Canonical values, only for fields that validated.
    pub formatted: BTreeMap<String, String>,
    /// `email_valid` / `phone_valid` for each present, enabled contact field.
    pub validation_details: BTreeMap<String, bool>,
    pub flags: SuspiciousFlags,
    pub score: f64,
    pub is_valid: bool,
}

/// Validity and canonical form of one contact field.
struct FieldCheck {
    raw: Option<String>,
    valid: bool,
    formatted: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidationProcessor {
    data: Dataset,
    config: ValidationConfig,
    weights: ScoreWeights,
}

impl ValidationProcessor {
    #[must_use]
    pub fn new(data: Dataset) -> Self {
        Self {
            data,
            config: ValidationConfig::default(),
            weights: ScoreWeights::default(),
        }
    }

    /// Build from raw JSON, which must be an array of objects.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Core`] wrapping
    /// [`leadscrape_core::CoreError::NotTabular`] or `InvalidRow` for
    /// non-tabular input.
    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        Ok(Self::new(Dataset::from_json(value)?))
    }

    #[must_use]
    pub fn with_config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    #[must_use]
    pub fn data(&self) -> &Dataset {
        &self.data
    }

    #[must_use]
    pub fn into_data(self) -> Dataset {
        self.data
    }

    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    #[must_use]
    pub fn calculate_quality_score(&self, record: &Record) -> f64 {
        calculate_quality_score(record, &self.weights)
    }

    #[must_use]
    pub fn flag_suspicious_data(&self, record: &Record) -> SuspiciousFlags {
        detect_suspicious(record)
    }

    /// Validate, format, flag, and score a single record.
    ///
    /// `is_valid` holds when the record has no (enabled) contact field, or
    /// when every present contact field validates.
    #[must_use]
    pub fn validate_record(&self, record: &Record) -> ValidationResult {
        let score = self.calculate_quality_score(record);
        self.result_for(record, &check_email(record), &check_phone(record), score)
    }

    fn result_for(
        &self,
        record: &Record,
        email: &FieldCheck,
        phone: &FieldCheck,
        score: f64,
    ) -> ValidationResult {
        let mut formatted = BTreeMap::new();
        let mut validation_details = BTreeMap::new();
        let checks = [
            (self.config.enable_email_validation, fields::EMAIL, fields::EMAIL_VALID, email),
            (self.config.enable_phone_validation, fields::PHONE, fields::PHONE_VALID, phone),
        ];
        for (enabled, field, valid_key, check) in checks {
            if !enabled || check.raw.is_none() {
                continue;
            }
            validation_details.insert(valid_key.to_string(), check.valid);
            if let Some(value) = &check.formatted {
                formatted.insert(field.to_string(), value.clone());
            }
        }
        let is_valid = validation_details.values().all(|&valid| valid);

        ValidationResult {
            formatted,
            validation_details,
            flags: detect_suspicious(record),
            score,
            is_valid,
        }
    }

    /// Copy of the data with `email_valid` and `email_formatted` only.
    #[must_use]
    pub fn validate_emails(&self) -> Dataset {
        let mut data = self.data.clone();
        data.update_records(|record| {
            let check = check_email(record);
            write_check(record, fields::EMAIL_VALID, fields::EMAIL_FORMATTED, check);
        });
        let valid = count_true(&data, fields::EMAIL_VALID);
        tracing::info!(valid, total = data.len(), "email validation complete");
        data
    }

    /// Copy of the data with `phone_valid` and `phone_formatted` only.
    #[must_use]
    pub fn validate_phone_numbers(&self) -> Dataset {
        let mut data = self.data.clone();
        data.update_records(|record| {
            let check = check_phone(record);
            write_check(record, fields::PHONE_VALID, fields::PHONE_FORMATTED, check);
        });
        let valid = count_true(&data, fields::PHONE_VALID);
        tracing::info!(valid, total = data.len(), "phone validation complete");
        data
    }

    /// Full validation pass: every derived column on a copy of the data.
    #[must_use]
    pub fn process(&self) -> Dataset {
        self.annotate(self.data.clone())
    }

    /// Deduplicate per `dedup`, then run the full validation pass on the
    /// survivors.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Dedupe`] when the deduplication settings
    /// name columns the data does not have.
    pub fn process_with(&self, dedup: &DeduplicationConfig) -> Result<Dataset, ValidationError> {
        let mut deduplicator = Deduplicator::new(self.data.clone());
        deduplicator.apply_config(dedup)?;
        let stats = deduplicator.deduplication_stats();
        tracing::info!(
            removed = stats.removed_count,
            remaining = stats.current_count,
            "deduplication before validation complete"
        );
        Ok(self.annotate(deduplicator.into_data()))
    }

    /// Records scoring at least `min_score`, given as a fraction (`<= 1`) or
    /// a percentage. An existing numeric `validation_score` is trusted;
    /// otherwise the score is computed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Config`] for a negative or above-100
    /// threshold.
    pub fn filter_by_quality_score(&self, min_score: f64) -> Result<Dataset, ValidationError> {
        Ok(self.filter_by_threshold(QualityThreshold::new(min_score)?))
    }

    /// [`filter_by_quality_score`](Self::filter_by_quality_score) for an
    /// already validated threshold.
    #[must_use]
    pub fn filter_by_threshold(&self, threshold: QualityThreshold) -> Dataset {
        let threshold = threshold.percent();
        let mut data = self.data.clone();
        let columns = data.columns().to_vec();
        let before = data.len();
        data.retain(|record| {
            let score = record
                .get(fields::VALIDATION_SCORE)
                .and_then(Value::as_f64)
                .unwrap_or_else(|| calculate_row_score(record, &self.weights, &columns));
            score >= threshold
        });
        tracing::info!(
            threshold,
            kept = data.len(),
            removed = before - data.len(),
            "quality filter applied"
        );
        data
    }

    /// Dataset-level assessment of the current data through `monitor`.
    pub fn assess_data_quality(
        &self,
        monitor: &mut QualityMonitor,
        source: &str,
    ) -> QualityAssessment {
        monitor.assess(&self.data, source)
    }

    /// Rows are scored against the dataset's columns, so a column some
    /// records never set still counts toward every row's total.
    fn annotate(&self, mut data: Dataset) -> Dataset {
        let columns = data.columns().to_vec();
        data.update_records(|record| {
            let email = check_email(record);
            let phone = check_phone(record);
            let score = calculate_row_score(record, &self.weights, &columns);
            let result = self.result_for(record, &email, &phone, score);
            if self.config.enable_email_validation {
                write_check(record, fields::EMAIL_VALID, fields::EMAIL_FORMATTED, email);
            }
            if self.config.enable_phone_validation {
                write_check(record, fields::PHONE_VALID, fields::PHONE_FORMATTED, phone);
            }
            record.set(fields::VALIDATION_SCORE, result.score);
            record.set(
                fields::VALIDATION_FLAGS,
                json!({
                    "suspicious_email": result.flags.suspicious_email,
                    "suspicious_phone": result.flags.suspicious_phone,
                }),
            );
            record.set(fields::SUSPICIOUS, result.flags.any());
            record.set(fields::IS_VALID, result.is_valid);
        });

        tracing::info!(
            records = data.len(),
            valid = count_true(&data, fields::IS_VALID),
            suspicious = count_true(&data, fields::SUSPICIOUS),
            "validation pass complete"
        );
        data
    }
}

fn check_email(record: &Record) -> FieldCheck {
    let raw = record.text(fields::EMAIL);
    let valid = raw.as_deref().is_some_and(validate_email);
    let formatted = if valid {
        raw.as_deref().and_then(format_email)
    } else {
        None
    };
    FieldCheck {
        raw,
        valid,
        formatted,
    }
}

fn check_phone(record: &Record) -> FieldCheck {
    let hint = country_hint(record);
    let raw = record.text(fields::PHONE);
    let valid = raw
        .as_deref()
        .is_some_and(|phone| validate_phone_number(phone, hint));
    let formatted = if valid {
        raw.as_deref()
            .and_then(|phone| format_phone_number(phone, hint))
    } else {
        None
    };
    FieldCheck {
        raw,
        valid,
        formatted,
    }
}

/// `*_formatted` holds the canonical value when valid and the raw value
/// (or null) otherwise.
fn write_check(record: &mut Record, valid_column: &str, formatted_column: &str, check: FieldCheck) {
    let formatted = match (check.formatted, check.raw) {
        (Some(canonical), _) => Value::String(canonical),
        (None, Some(raw)) => Value::String(raw),
        (None, None) => Value::Null,
    };
    record.set(valid_column, check.valid);
    record.set(formatted_column, formatted);
}

fn count_true(data: &Dataset, column: &str) -> usize {
    data.iter()
        .filter(|r| r.get(column).and_then(Value::as_bool).unwrap_or(false))
        .count()
}

#[cfg(test)]
#[path = "processor_test.rs"]
mod tests;
