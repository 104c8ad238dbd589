//! Rules and thresholds for dataset-level quality assessment.
//!
//! Defaults cover the canonical lead fields. A YAML document can override
//! any part under a top-level `quality:` key (the same file that carries the
//! pipeline configuration); per-field overrides merge into the default rule
//! for that field instead of replacing it.

use std::collections::BTreeMap;
use std::path::Path;

use leadscrape_core::fields;
use serde::{Deserialize, Serialize};

use crate::ValidationError;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";
const PHONE_PATTERN: &str = r"^(\+\d{1,3})?\s*(\(\d{1,4}\))?\s*[\d\s-]{5,}$";
const WEBSITE_PATTERN: &str = r"^(https?://)?(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_+.~#?&/=]*)$";

const DEFAULT_SUSPICIOUS_PATTERNS: &[&str] = &[
    r"test[0-9]*@",
    r"example\.com$",
    r"@example\.",
    r"@test\.",
    r"^[a-z]{1,3}@",
    r"12345",
    r"^admin@",
    r"^info@",
    r"^sales@",
];

/// Validation rule for one field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldRule {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// Regex the trimmed text value must match.
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternDetection {
    pub enabled: bool,
    /// Case-insensitive regexes searched anywhere in the value.
    pub suspicious_patterns: Vec<String>,
}

impl Default for PatternDetection {
    fn default() -> Self {
        Self {
            enabled: true,
            suspicious_patterns: DEFAULT_SUSPICIOUS_PATTERNS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyDetection {
    pub enabled: bool,
    /// Numeric values further than this many sample standard deviations
    /// from the column mean are outliers.
    pub std_dev_threshold: f64,
    /// Categorical values rarer than this share of non-null cells are flagged.
    pub categorical_frequency_threshold: f64,
}

impl Default for AnomalyDetection {
    fn default() -> Self {
        Self {
            enabled: true,
            std_dev_threshold: 3.0,
            categorical_frequency_threshold: 0.01,
        }
    }
}

/// Complete quality-monitor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Share of records missing a required field above which an aggregate
    /// issue is raised.
    pub missing_threshold: f64,
    pub duplicate_threshold: f64,
    pub invalid_threshold: f64,
    pub field_rules: BTreeMap<String, FieldRule>,
    pub pattern_detection: PatternDetection,
    pub anomaly_detection: AnomalyDetection,
}

impl Default for QualityConfig {
    fn default() -> Self {
        let mut field_rules = BTreeMap::new();
        field_rules.insert(
            fields::BUSINESS_NAME.to_string(),
            FieldRule {
                required: true,
                min_length: Some(2),
                max_length: Some(100),
                pattern: None,
            },
        );
        field_rules.insert(
            fields::EMAIL.to_string(),
            FieldRule {
                required: true,
                pattern: Some(EMAIL_PATTERN.to_string()),
                ..FieldRule::default()
            },
        );
        field_rules.insert(
            fields::PHONE.to_string(),
            FieldRule {
                required: true,
                pattern: Some(PHONE_PATTERN.to_string()),
                ..FieldRule::default()
            },
        );
        field_rules.insert(
            fields::WEBSITE.to_string(),
            FieldRule {
                pattern: Some(WEBSITE_PATTERN.to_string()),
                ..FieldRule::default()
            },
        );
        field_rules.insert(
            fields::ADDRESS.to_string(),
            FieldRule {
                min_length: Some(5),
                ..FieldRule::default()
            },
        );
        field_rules.insert(fields::DESCRIPTION.to_string(), FieldRule::default());

        Self {
            missing_threshold: 0.1,
            duplicate_threshold: 0.05,
            invalid_threshold: 0.1,
            field_rules,
            pattern_detection: PatternDetection::default(),
            anomaly_detection: AnomalyDetection::default(),
        }
    }
}

/// Partial field rule as written in a config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FieldRuleOverride {
    required: Option<bool>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QualityOverrides {
    missing_threshold: Option<f64>,
    duplicate_threshold: Option<f64>,
    invalid_threshold: Option<f64>,
    field_rules: BTreeMap<String, FieldRuleOverride>,
    pattern_detection: Option<PatternDetection>,
    anomaly_detection: Option<AnomalyDetection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigDocument {
    quality: QualityOverrides,
}

impl QualityConfig {
    /// Defaults with the `quality:` section of a YAML document applied.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ConfigParse`] for malformed YAML and
    /// [`ValidationError::InvalidQualityConfig`] for out-of-range thresholds.
    pub fn from_yaml_str(input: &str) -> Result<Self, ValidationError> {
        let document: ConfigDocument = serde_yaml::from_str(input)?;
        let mut config = Self::default();
        config.merge(document.quality);
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::Io`] if the file cannot be read, otherwise
    /// the errors of [`QualityConfig::from_yaml_str`].
    pub fn from_yaml_file(path: &Path) -> Result<Self, ValidationError> {
        let input = std::fs::read_to_string(path).map_err(|source| ValidationError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&input)
    }

    /// Names of fields whose rule marks them required.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.field_rules
            .iter()
            .filter(|(_, rule)| rule.required)
            .map(|(name, _)| name.as_str())
    }

    fn merge(&mut self, overrides: QualityOverrides) {
        if let Some(v) = overrides.missing_threshold {
            self.missing_threshold = v;
        }
        if let Some(v) = overrides.duplicate_threshold {
            self.duplicate_threshold = v;
        }
        if let Some(v) = overrides.invalid_threshold {
            self.invalid_threshold = v;
        }
        for (field, update) in overrides.field_rules {
            let rule = self.field_rules.entry(field).or_default();
            if let Some(required) = update.required {
                rule.required = required;
            }
            if update.min_length.is_some() {
                rule.min_length = update.min_length;
            }
            if update.max_length.is_some() {
                rule.max_length = update.max_length;
            }
            if update.pattern.is_some() {
                rule.pattern = update.pattern;
            }
        }
        if let Some(pattern_detection) = overrides.pattern_detection {
            self.pattern_detection = pattern_detection;
        }
        if let Some(anomaly_detection) = overrides.anomaly_detection {
            self.anomaly_detection = anomaly_detection;
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        for (name, value) in [
            ("missing_threshold", self.missing_threshold),
            ("duplicate_threshold", self.duplicate_threshold),
            ("invalid_threshold", self.invalid_threshold),
            (
                "categorical_frequency_threshold",
                self.anomaly_detection.categorical_frequency_threshold,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::InvalidQualityConfig(format!(
                    "{name} must be a fraction within 0..=1, got {value}"
                )));
            }
        }
        let std_dev = self.anomaly_detection.std_dev_threshold;
        if std_dev.is_nan() || std_dev <= 0.0 {
            return Err(ValidationError::InvalidQualityConfig(format!(
                "std_dev_threshold must be positive, got {std_dev}"
            )));
        }
        Ok(())
    }
}
