//! Export boundary.
//!
//! Spreadsheet-style collaborators take a header row plus data rows of flat
//! cells; [`to_sheet_rows`] produces that shape. [`Exporter`] is the seam the
//! driver hands processed data to.

use std::path::{Path, PathBuf};

use chrono::Utc;
use leadscrape_core::Dataset;
use serde::Serialize;
use serde_json::Value;

use crate::ExportError;

/// One flat spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SheetCell {
    Text(String),
    Number(f64),
}

impl From<&Value> for SheetCell {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Text(String::new()),
            Value::Bool(true) => Self::Text("TRUE".to_string()),
            Value::Bool(false) => Self::Text("FALSE".to_string()),
            Value::Number(n) => n
                .as_f64()
                .map_or_else(|| Self::Text(n.to_string()), Self::Number),
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => Self::Text(value.to_string()),
        }
    }
}

/// Header row of column names followed by one row per record, every cell a
/// primitive. Missing cells are empty text.
#[must_use]
pub fn to_sheet_rows(data: &Dataset) -> Vec<Vec<SheetCell>> {
    let columns = data.columns();
    let mut rows = Vec::with_capacity(data.len() + 1);
    rows.push(
        columns
            .iter()
            .map(|c| SheetCell::Text(c.clone()))
            .collect(),
    );
    for record in data.iter() {
        rows.push(
            columns
                .iter()
                .map(|c| record.get(c).map_or(SheetCell::Text(String::new()), SheetCell::from))
                .collect(),
        );
    }
    rows
}

/// Where an export landed and how much it wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReceipt {
    pub destination: String,
    pub rows: usize,
}

pub trait Exporter {
    fn name(&self) -> &str;

    /// # Errors
    ///
    /// Returns [`ExportError`] when the destination rejects or cannot store
    /// the data.
    fn export(&self, data: &Dataset) -> Result<ExportReceipt, ExportError>;
}

/// Writes the sheet rows as a JSON array of arrays into a directory, one
/// timestamped file per export.
#[derive(Debug, Clone)]
pub struct JsonFileExporter {
    dir: PathBuf,
    prefix: String,
}

impl JsonFileExporter {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: "leads".to_string(),
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Exporter for JsonFileExporter {
    fn name(&self) -> &str {
        "json_file"
    }

    fn export(&self, data: &Dataset) -> Result<ExportReceipt, ExportError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| ExportError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;

        let rows = to_sheet_rows(data);
        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        let path = self.dir.join(format!("{}_{stamp}.json", self.prefix));
        let body = serde_json::to_string_pretty(&rows)?;
        std::fs::write(&path, body).map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })?;

        tracing::info!(path = %path.display(), rows = data.len(), "dataset exported");
        Ok(ExportReceipt {
            destination: path.display().to_string(),
            rows: data.len(),
        })
    }
}
