//! Blocked deduplication for large inputs.
//!
//! Records are sorted into blocks by a short prefix of their primary match
//! field. Fuzzy comparisons only run inside a block and between a block and
//! its neighbour in key order; exact matches are found globally by hashing.
//! Block work is described by index ranges into one shared, read-only arena,
//! so the parallel path needs no locking and yields the same pair set as the
//! sequential one.

use std::collections::BTreeMap;

use leadscrape_core::Dataset;
use rayon::prelude::*;

use crate::cluster::{ordered, Pair};
use crate::engine::{check_threshold, exact_pairs, resolve_columns};
use crate::keys::field_key;
use crate::similarity::{normalize, normalized_similarity};
use crate::{DedupeError, Deduplicator};

pub const DEFAULT_BATCH_SIZE: usize = 500;

const BLOCK_PREFIX_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct LargeDatasetOptions {
    /// First field is fuzzy-compared; the rest must agree when both sides
    /// have a value.
    pub match_fields: Vec<String>,
    pub threshold: f64,
    pub use_parallel: bool,
    /// Rows per comparison task.
    pub batch_size: usize,
    pub keep_most_complete: bool,
}

impl Default for LargeDatasetOptions {
    fn default() -> Self {
        Self {
            match_fields: vec![
                leadscrape_core::fields::BUSINESS_NAME.to_string(),
                leadscrape_core::fields::LOCATION.to_string(),
                leadscrape_core::fields::PHONE.to_string(),
            ],
            threshold: 80.0,
            use_parallel: false,
            batch_size: DEFAULT_BATCH_SIZE,
            keep_most_complete: false,
        }
    }
}

struct Candidate {
    index: usize,
    primary: String,
    secondary: Vec<Option<String>>,
}

impl Candidate {
    fn matches(&self, other: &Candidate, threshold: f64) -> bool {
        let compatible = self
            .secondary
            .iter()
            .zip(&other.secondary)
            .all(|pair| match pair {
                (Some(a), Some(b)) => a == b,
                _ => true,
            });
        compatible && normalized_similarity(&self.primary, &other.primary) >= threshold
    }
}

/// One unit of block work: rows `start..end` of block `block`, compared with
/// the later rows of the same block and with every row of the next block.
struct Task {
    block: usize,
    start: usize,
    end: usize,
}

impl Deduplicator {
    /// Deduplicate a large dataset by blocking, optionally on the rayon pool.
    ///
    /// Unknown match fields are dropped with a warning. The sequential and
    /// parallel paths compute the same duplicate pairs and therefore keep
    /// the same records.
    ///
    /// # Errors
    ///
    /// Returns [`DedupeError::NoValidColumns`] when no match field exists and
    /// [`DedupeError::InvalidThreshold`] for a threshold outside `0..=100`.
    pub fn deduplicate_large_dataset(
        &mut self,
        options: &LargeDatasetOptions,
    ) -> Result<&Dataset, DedupeError> {
        let fields = resolve_columns(self.data(), &options.match_fields, "deduplicate_large_dataset")?;
        check_threshold(options.threshold)?;

        let (primary, secondary) = fields.split_first().ok_or(DedupeError::EmptyFieldList {
            operation: "deduplicate_large_dataset",
        })?;
        let arena = build_arena(self.data(), primary, secondary);
        let blocks = build_blocks(&arena);
        let tasks = plan_tasks(&blocks, options.batch_size.max(1));

        let run = |task: &Task| compare_task(&arena, &blocks, task, options.threshold);
        let mut pairs: Vec<Pair> = if options.use_parallel {
            tasks.par_iter().flat_map_iter(run).collect()
        } else {
            tasks.iter().flat_map(run).collect()
        };
        pairs.extend(exact_pairs(self.data(), &fields));
        pairs.sort_unstable();
        pairs.dedup();

        tracing::debug!(
            blocks = blocks.len(),
            tasks = tasks.len(),
            pairs = pairs.len(),
            parallel = options.use_parallel,
            "blocked comparison finished"
        );

        let removed = self.apply(pairs, options.keep_most_complete);
        tracing::info!(
            removed,
            remaining = self.data().len(),
            parallel = options.use_parallel,
            "large dataset deduplication complete"
        );
        Ok(self.data())
    }
}

fn build_arena(data: &Dataset, primary: &str, secondary: &[String]) -> Vec<Candidate> {
    data.iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let primary = normalize(&record.text(primary)?);
            Some(Candidate {
                index,
                primary,
                secondary: secondary.iter().map(|f| field_key(record, f)).collect(),
            })
        })
        .collect()
}

/// Arena positions grouped by block key, blocks in key order.
fn build_blocks(arena: &[Candidate]) -> Vec<Vec<usize>> {
    let mut by_key: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (position, candidate) in arena.iter().enumerate() {
        by_key
            .entry(block_key(&candidate.primary))
            .or_default()
            .push(position);
    }
    by_key.into_values().collect()
}

fn block_key(primary: &str) -> String {
    let key: String = primary
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(BLOCK_PREFIX_LEN)
        .collect();
    if key.is_empty() {
        primary.chars().take(BLOCK_PREFIX_LEN).collect()
    } else {
        key
    }
}

fn plan_tasks(blocks: &[Vec<usize>], batch_size: usize) -> Vec<Task> {
    let mut tasks = Vec::new();
    for (block, members) in blocks.iter().enumerate() {
        let mut start = 0;
        while start < members.len() {
            let end = (start + batch_size).min(members.len());
            tasks.push(Task { block, start, end });
            start = end;
        }
    }
    tasks
}

fn compare_task(arena: &[Candidate], blocks: &[Vec<usize>], task: &Task, threshold: f64) -> Vec<Pair> {
    let members = &blocks[task.block];
    let next = blocks.get(task.block + 1).map_or(&[][..], Vec::as_slice);
    let mut pairs = Vec::new();
    for offset in task.start..task.end {
        let left = &arena[members[offset]];
        for &position in members[offset + 1..].iter().chain(next) {
            let right = &arena[position];
            if left.matches(right, threshold) {
                pairs.push(ordered(left.index, right.index));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_key_skips_punctuation() {
        assert_eq!(block_key("'la casa"), "lac");
        assert_eq!(block_key("--"), "--");
    }

    #[test]
    fn plan_tasks_splits_blocks_into_batches() {
        let blocks = vec![(0..5).collect::<Vec<_>>(), vec![5]];
        let tasks = plan_tasks(&blocks, 2);
        let spans: Vec<(usize, usize, usize)> =
            tasks.iter().map(|t| (t.block, t.start, t.end)).collect();
        assert_eq!(spans, vec![(0, 0, 2), (0, 2, 4), (0, 4, 5), (1, 0, 1)]);
    }
}
