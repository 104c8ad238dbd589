//! Shared data model and configuration for the lead pipeline.
//!
//! Records are schema-loose JSON objects; a [`Dataset`] is an ordered run of
//! them with a first-seen column set. Every other crate in the workspace
//! operates on these two types.

pub mod config;
mod error;
pub mod fields;
mod record;

pub use config::{
    build_pipeline_config, load_pipeline_config, load_pipeline_config_file, DeduplicationConfig,
    PipelineConfig, QualityThreshold, ValidationConfig,
};
pub use error::{ConfigError, CoreError};
pub use record::{Dataset, Record};
