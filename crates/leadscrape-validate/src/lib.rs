//! Contact validation, scoring, and dataset quality monitoring for scraped
//! business leads.
//!
//! The per-field validators ([`validate_email`], [`validate_phone_number`])
//! and the [`calculate_quality_score`] scorer work on single values or
//! records. [`ValidationProcessor`] applies them across a dataset, and
//! [`QualityMonitor`] rates whole batches and keeps per-source history.

pub mod countries;
pub mod email;
mod error;
pub mod extract;
pub mod phone;
mod processor;
pub mod quality;
pub mod scorer;
pub mod suspicious;

pub use countries::{
    country_hint, country_profile, infer_country, CountryProfile, COUNTRY_PROFILES,
};
pub use email::{format_email, validate_email};
pub use error::ValidationError;
pub use extract::{clean_text, extract_emails, extract_phone_numbers, extract_urls};
pub use phone::{format_phone_number, parse_phone_number, validate_phone_number, ParsedPhone};
pub use processor::{ValidationProcessor, ValidationResult};
pub use quality::{
    IssueKind, QualityAssessment, QualityConfig, QualityIssue, QualityMonitor, QualityReport,
    QualityStatistics,
};
pub use scorer::{calculate_quality_score, ScoreWeights};
pub use suspicious::{detect_suspicious, SuspiciousFlags};
