use thiserror::Error;

#[derive(Debug, Error)]
pub enum DedupeError {
    #[error("column not found: {column}")]
    ColumnNotFound { column: String },

    #[error("none of the requested columns exist in the dataset: {}", requested.join(", "))]
    NoValidColumns { requested: Vec<String> },

    #[error("invalid {name}: {value} (must be within 0..=100)")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("{operation} requires at least one field")]
    EmptyFieldList { operation: &'static str },
}
