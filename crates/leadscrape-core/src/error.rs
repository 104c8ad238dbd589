use thiserror::Error;

/// Errors raised while shaping raw input into a [`crate::Dataset`].
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("input is not tabular: expected an array of objects, found {found}")]
    NotTabular { found: String },

    #[error("row {index} is not an object (found {found})")]
    InvalidRow { index: usize, found: String },

    #[error("failed to parse JSON input: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("invalid configuration: {0}")]
    Validation(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ConfigFileParse(#[from] serde_yaml::Error),
}
