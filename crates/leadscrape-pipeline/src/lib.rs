//! Batch driver for scraped business leads.
//!
//! [`LeadPipeline::run`] takes one batch from a source through cleaning,
//! deduplication, validation and scoring, dataset-level quality assessment,
//! optional quality filtering, and export. Observability for the run lives in
//! an explicit [`RunContext`] rather than process-wide state.

mod clean;
mod context;
mod error;
mod export;
mod pipeline;

pub use clean::{clean_dataset, drop_missing_identity};
pub use context::{QualityAlert, RunContext, StageTiming};
pub use error::{ExportError, ExportFailure, PipelineError};
pub use export::{to_sheet_rows, ExportReceipt, Exporter, JsonFileExporter, SheetCell};
pub use pipeline::{LeadPipeline, PipelineOutcome};
