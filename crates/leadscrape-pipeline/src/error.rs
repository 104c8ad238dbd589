use leadscrape_core::ConfigError;
use leadscrape_validate::ValidationError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("export rejected by {exporter}: {reason}")]
    Rejected { exporter: String, reason: String },
}

/// Error descriptor returned alongside the processed data when the export
/// step fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportFailure {
    pub exporter: String,
    pub message: String,
}

impl ExportFailure {
    #[must_use]
    pub fn new(exporter: &str, error: &ExportError) -> Self {
        Self {
            exporter: exporter.to_string(),
            message: error.to_string(),
        }
    }
}
