//! `dedupe` command: blocked large-dataset deduplication.

use std::path::Path;

use leadscrape_dedupe::{Deduplicator, LargeDatasetOptions};

use crate::{read_dataset, write_json};

pub(crate) fn run_dedupe(
    input: &Path,
    fields: Vec<String>,
    threshold: f64,
    parallel: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let data = read_dataset(input)?;
    let mut deduplicator = Deduplicator::new(data);
    deduplicator.deduplicate_large_dataset(&LargeDatasetOptions {
        match_fields: fields,
        threshold,
        use_parallel: parallel,
        ..LargeDatasetOptions::default()
    })?;

    let stats = deduplicator.deduplication_stats();
    write_json(&deduplicator.data().to_json(), output)?;
    tracing::info!(
        removed = stats.removed_count,
        original = stats.original_count,
        removed_percentage = stats.removed_percentage,
        "dedupe complete"
    );
    Ok(())
}
