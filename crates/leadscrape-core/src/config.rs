//! Typed pipeline configuration.
//!
//! Values come from `LEADSCRAPE_*` environment variables (optionally seeded
//! from a `.env` file) or from a YAML file. Both paths validate on
//! construction, so downstream code never re-checks ranges.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::fields;
use crate::ConfigError;

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 80.0;
pub const DEFAULT_QUALITY_ALERT_THRESHOLD: f64 = 70.0;

/// Minimum per-record quality score, always held as a 0–100 percentage.
///
/// Raw inputs `<= 1.0` are read as fractions and scaled by 100, so `0.6` and
/// `60` mean the same threshold.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct QualityThreshold(f64);

impl QualityThreshold {
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for negative, non-finite, or
    /// greater-than-100 values.
    pub fn new(raw: f64) -> Result<Self, ConfigError> {
        if !raw.is_finite() || raw < 0.0 {
            return Err(ConfigError::Validation(format!(
                "quality threshold must be a non-negative number, got {raw}"
            )));
        }
        let percent = if raw <= 1.0 { raw * 100.0 } else { raw };
        if percent > 100.0 {
            return Err(ConfigError::Validation(format!(
                "quality threshold must not exceed 100, got {raw}"
            )));
        }
        Ok(Self(percent))
    }

    #[must_use]
    pub fn percent(self) -> f64 {
        self.0
    }

    /// A zero threshold disables filtering.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        self.0 > 0.0
    }
}

impl TryFrom<f64> for QualityThreshold {
    type Error = ConfigError;

    fn try_from(raw: f64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<QualityThreshold> for f64 {
    fn from(t: QualityThreshold) -> Self {
        t.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeduplicationConfig {
    pub exact_match: bool,
    pub fuzzy_match: bool,
    pub fuzzy_threshold: f64,
    /// Fields compared for exact duplicates.
    pub match_fields: Vec<String>,
    /// Fields compared by string similarity when `fuzzy_match` is on.
    pub fuzzy_fields: Vec<String>,
    pub keep_most_complete: bool,
}

impl Default for DeduplicationConfig {
    fn default() -> Self {
        Self {
            exact_match: true,
            fuzzy_match: false,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            match_fields: vec![
                fields::BUSINESS_NAME.to_string(),
                fields::PHONE.to_string(),
                fields::EMAIL.to_string(),
            ],
            fuzzy_fields: vec![fields::BUSINESS_NAME.to_string()],
            keep_most_complete: false,
        }
    }
}

impl DeduplicationConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when the threshold is outside
    /// `[0, 100]` or an enabled strategy has no fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.fuzzy_threshold) {
            return Err(ConfigError::Validation(format!(
                "deduplication.fuzzy_threshold must be within 0..=100, got {}",
                self.fuzzy_threshold
            )));
        }
        if self.exact_match && self.match_fields.is_empty() {
            return Err(ConfigError::Validation(
                "deduplication.match_fields must not be empty when exact_match is enabled"
                    .to_string(),
            ));
        }
        if self.fuzzy_match && self.fuzzy_fields.is_empty() {
            return Err(ConfigError::Validation(
                "deduplication.fuzzy_fields must not be empty when fuzzy_match is enabled"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub enable_email_validation: bool,
    pub enable_phone_validation: bool,
    pub min_data_quality: QualityThreshold,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enable_email_validation: true,
            enable_phone_validation: true,
            min_data_quality: QualityThreshold::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub deduplication: DeduplicationConfig,
    pub validation: ValidationConfig,
    /// Dataset-level quality score below which a run raises an alert.
    pub quality_alert_threshold: f64,
    pub log_level: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            deduplication: DeduplicationConfig::default(),
            validation: ValidationConfig::default(),
            quality_alert_threshold: DEFAULT_QUALITY_ALERT_THRESHOLD,
            log_level: "info".to_string(),
        }
    }
}

impl PipelineConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if any section is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.deduplication.validate()?;
        if !(0.0..=100.0).contains(&self.quality_alert_threshold) {
            return Err(ConfigError::Validation(format!(
                "quality_alert_threshold must be within 0..=100, got {}",
                self.quality_alert_threshold
            )));
        }
        Ok(())
    }
}

/// Load pipeline configuration from the environment.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but malformed or out of range.
pub fn load_pipeline_config() -> Result<PipelineConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_pipeline_config(|key| std::env::var(key))
}

/// Load pipeline configuration from a YAML file. Missing keys take defaults.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_pipeline_config_file(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ConfigFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_pipeline_config(&content)
}

fn parse_pipeline_config(content: &str) -> Result<PipelineConfig, ConfigError> {
    let config: PipelineConfig = serde_yaml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Build pipeline configuration using the provided env-var lookup function.
///
/// Every variable is optional; unset ones fall back to [`PipelineConfig::default`].
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] naming the first malformed variable.
pub fn build_pipeline_config<F>(lookup: F) -> Result<PipelineConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let defaults = PipelineConfig::default();

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        let Ok(raw) = lookup(var) else {
            return Ok(default);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok(true),
            "false" | "no" | "0" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
        }
    };

    let parse_f64 = |var: &str, default: f64| -> Result<f64, ConfigError> {
        let Ok(raw) = lookup(var) else {
            return Ok(default);
        };
        raw.trim()
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_list = |var: &str, default: &[String]| -> Result<Vec<String>, ConfigError> {
        let Ok(raw) = lookup(var) else {
            return Ok(default.to_vec());
        };
        let items: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if items.is_empty() {
            return Err(invalid(var, "expected a comma-separated list of field names".to_string()));
        }
        Ok(items)
    };

    let deduplication = DeduplicationConfig {
        exact_match: parse_bool("LEADSCRAPE_DEDUP_EXACT_MATCH", defaults.deduplication.exact_match)?,
        fuzzy_match: parse_bool("LEADSCRAPE_DEDUP_FUZZY_MATCH", defaults.deduplication.fuzzy_match)?,
        fuzzy_threshold: parse_f64(
            "LEADSCRAPE_FUZZY_THRESHOLD",
            defaults.deduplication.fuzzy_threshold,
        )?,
        match_fields: parse_list("LEADSCRAPE_MATCH_FIELDS", &defaults.deduplication.match_fields)?,
        fuzzy_fields: parse_list("LEADSCRAPE_FUZZY_FIELDS", &defaults.deduplication.fuzzy_fields)?,
        keep_most_complete: parse_bool(
            "LEADSCRAPE_KEEP_MOST_COMPLETE",
            defaults.deduplication.keep_most_complete,
        )?,
    };
    if !(0.0..=100.0).contains(&deduplication.fuzzy_threshold) {
        return Err(invalid(
            "LEADSCRAPE_FUZZY_THRESHOLD",
            format!("must be within 0..=100, got {}", deduplication.fuzzy_threshold),
        ));
    }

    let min_quality_raw = parse_f64("LEADSCRAPE_MIN_DATA_QUALITY", 0.0)?;
    let min_data_quality = QualityThreshold::new(min_quality_raw)
        .map_err(|e| invalid("LEADSCRAPE_MIN_DATA_QUALITY", e.to_string()))?;

    let validation = ValidationConfig {
        enable_email_validation: parse_bool(
            "LEADSCRAPE_ENABLE_EMAIL_VALIDATION",
            defaults.validation.enable_email_validation,
        )?,
        enable_phone_validation: parse_bool(
            "LEADSCRAPE_ENABLE_PHONE_VALIDATION",
            defaults.validation.enable_phone_validation,
        )?,
        min_data_quality,
    };

    let quality_alert_threshold = parse_f64(
        "LEADSCRAPE_QUALITY_ALERT_THRESHOLD",
        defaults.quality_alert_threshold,
    )?;
    if !(0.0..=100.0).contains(&quality_alert_threshold) {
        return Err(invalid(
            "LEADSCRAPE_QUALITY_ALERT_THRESHOLD",
            format!("must be within 0..=100, got {quality_alert_threshold}"),
        ));
    }

    let log_level = lookup("LEADSCRAPE_LOG_LEVEL").unwrap_or(defaults.log_level);

    let config = PipelineConfig {
        deduplication,
        validation,
        quality_alert_threshold,
        log_level,
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
