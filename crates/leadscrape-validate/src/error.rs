use leadscrape_core::{ConfigError, CoreError};
use leadscrape_dedupe::DedupeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("deduplication failed: {0}")]
    Dedupe(#[from] DedupeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid quality configuration: {0}")]
    InvalidQualityConfig(String),

    #[error("failed to parse quality configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("invalid pattern \"{pattern}\": {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
