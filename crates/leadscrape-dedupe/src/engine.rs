use std::collections::{HashMap, HashSet};

use leadscrape_core::{DeduplicationConfig, Dataset, Record};
use serde::Serialize;

use crate::cluster::{components, ordered, survivors, Pair};
use crate::keys::{is_blank, record_key, RecordKey};
use crate::rules::{default_rules, MatchRule, RuleOperator};
use crate::similarity::{normalize, normalized_similarity};
use crate::DedupeError;

/// Record counts relative to the last checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeduplicationStats {
    pub original_count: usize,
    pub current_count: usize,
    pub removed_count: usize,
    /// Share of the checkpoint removed, rounded to two decimals.
    pub removed_percentage: f64,
}

/// Stateful deduplication over a working copy of a dataset.
///
/// Each `deduplicate_*` call narrows the working copy further; [`reset`]
/// restores the checkpoint and [`save_original`] moves the checkpoint to the
/// current state.
///
/// [`reset`]: Deduplicator::reset
/// [`save_original`]: Deduplicator::save_original
#[derive(Debug, Clone)]
pub struct Deduplicator {
    original: Dataset,
    data: Dataset,
}

impl Deduplicator {
    #[must_use]
    pub fn new(data: Dataset) -> Self {
        Self {
            original: data.clone(),
            data,
        }
    }

    #[must_use]
    pub fn data(&self) -> &Dataset {
        &self.data
    }

    #[must_use]
    pub fn into_data(self) -> Dataset {
        self.data
    }

    #[must_use]
    pub fn to_records(&self) -> Vec<Record> {
        self.data.records().to_vec()
    }

    /// Discard every change since the last checkpoint.
    pub fn reset(&mut self) {
        self.data = self.original.clone();
    }

    /// Make the current working copy the new checkpoint.
    pub fn save_original(&mut self) {
        self.original = self.data.clone();
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn deduplication_stats(&self) -> DeduplicationStats {
        let original_count = self.original.len();
        let current_count = self.data.len();
        let removed_count = original_count.saturating_sub(current_count);
        let removed_percentage = if original_count == 0 {
            0.0
        } else {
            round2(removed_count as f64 / original_count as f64 * 100.0)
        };
        DeduplicationStats {
            original_count,
            current_count,
            removed_count,
            removed_percentage,
        }
    }

    /// Remove records that are identical on `subset`.
    ///
    /// Unknown columns in `subset` are dropped with a warning. Emails compare
    /// case-insensitively and phones by digits; records blank on every
    /// subset column are never treated as duplicates of one another.
    ///
    /// # Errors
    ///
    /// Returns [`DedupeError::EmptyFieldList`] for an empty subset and
    /// [`DedupeError::NoValidColumns`] when none of its columns exist.
    pub fn deduplicate_exact<S: AsRef<str>>(
        &mut self,
        subset: &[S],
        keep_most_complete: bool,
    ) -> Result<&Dataset, DedupeError> {
        let subset = resolve_columns(&self.data, subset, "deduplicate_exact")?;
        let pairs = exact_pairs(&self.data, &subset);
        let removed = self.apply(pairs, keep_most_complete);
        tracing::info!(
            columns = ?subset,
            removed,
            remaining = self.data.len(),
            "exact deduplication complete"
        );
        Ok(&self.data)
    }

    /// Remove records whose `column` values are at least `threshold` similar
    /// (0–100) and that agree exactly on every `additional_exact` column.
    ///
    /// # Errors
    ///
    /// Returns [`DedupeError::ColumnNotFound`] if `column` or any additional
    /// column is missing, and [`DedupeError::InvalidThreshold`] when the
    /// threshold is outside `0..=100`.
    pub fn deduplicate_fuzzy<S: AsRef<str>>(
        &mut self,
        column: &str,
        threshold: f64,
        additional_exact: &[S],
        keep_most_complete: bool,
    ) -> Result<&Dataset, DedupeError> {
        let additional = require_columns(&self.data, column, additional_exact)?;
        check_threshold(threshold)?;
        let pairs = fuzzy_pairs(&self.data, column, threshold, &additional);
        let removed = self.apply(pairs, keep_most_complete);
        tracing::info!(
            column,
            threshold,
            removed,
            remaining = self.data.len(),
            "fuzzy deduplication complete"
        );
        Ok(&self.data)
    }

    /// Combine several rules into one pass.
    ///
    /// Each rule yields a set of duplicate pairs; a rule's operator joins its
    /// set with the next rule's (`Or` = union, `And` = intersection). One
    /// record survives per connected component of the final pair set.
    ///
    /// With `rules = None` the [`default_rules`] apply, and default rules
    /// whose columns are absent are skipped instead of failing.
    ///
    /// # Errors
    ///
    /// Returns the error of the first explicit rule that references a missing
    /// column or carries an out-of-range threshold.
    pub fn deduplicate(&mut self, rules: Option<&[MatchRule]>) -> Result<&Dataset, DedupeError> {
        let defaults;
        let (rules, lenient) = match rules {
            Some(rules) => (rules, false),
            None => {
                defaults = default_rules();
                (defaults.as_slice(), true)
            }
        };

        let mut combined: Option<HashSet<Pair>> = None;
        let mut pending_operator = RuleOperator::Or;
        for (position, rule) in rules.iter().enumerate() {
            let pairs = match self.rule_pairs(rule) {
                Ok(pairs) => pairs,
                Err(e) if lenient => {
                    tracing::warn!(rule = position, error = %e, "skipping default rule");
                    continue;
                }
                Err(e) => return Err(e),
            };
            tracing::debug!(rule = position, pairs = pairs.len(), "rule evaluated");

            combined = Some(match combined {
                None => pairs,
                Some(acc) => match pending_operator {
                    RuleOperator::Or => acc.union(&pairs).copied().collect(),
                    RuleOperator::And => acc.intersection(&pairs).copied().collect(),
                },
            });
            pending_operator = rule.operator();
        }

        let Some(pairs) = combined else {
            tracing::warn!("no deduplication rule applied; data unchanged");
            return Ok(&self.data);
        };
        let removed = self.apply(pairs, false);
        tracing::info!(
            rules = rules.len(),
            removed,
            remaining = self.data.len(),
            "rule-based deduplication complete"
        );
        Ok(&self.data)
    }

    /// Apply a [`DeduplicationConfig`]: exact on `match_fields` when enabled,
    /// then fuzzy on each of `fuzzy_fields` when enabled.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`deduplicate_exact`](Self::deduplicate_exact)
    /// and [`deduplicate_fuzzy`](Self::deduplicate_fuzzy).
    pub fn apply_config(&mut self, config: &DeduplicationConfig) -> Result<&Dataset, DedupeError> {
        if config.exact_match {
            self.deduplicate_exact(&config.match_fields, config.keep_most_complete)?;
        }
        if config.fuzzy_match {
            for field in &config.fuzzy_fields {
                self.deduplicate_fuzzy::<&str>(
                    field,
                    config.fuzzy_threshold,
                    &[],
                    config.keep_most_complete,
                )?;
            }
        }
        Ok(&self.data)
    }

    fn rule_pairs(&self, rule: &MatchRule) -> Result<HashSet<Pair>, DedupeError> {
        match rule {
            MatchRule::Exact { columns, .. } => {
                let mut missing = columns.iter().filter(|c| !self.data.has_column(c));
                if let Some(column) = missing.next() {
                    return Err(DedupeError::ColumnNotFound {
                        column: column.clone(),
                    });
                }
                if columns.is_empty() {
                    return Err(DedupeError::EmptyFieldList {
                        operation: "exact rule",
                    });
                }
                Ok(exact_pairs_complete(&self.data, columns))
            }
            MatchRule::Fuzzy {
                column,
                threshold,
                additional_exact,
                ..
            } => {
                let additional = require_columns(&self.data, column, additional_exact)?;
                check_threshold(*threshold)?;
                Ok(fuzzy_pairs(&self.data, column, *threshold, &additional)
                    .into_iter()
                    .collect())
            }
        }
    }

    /// Collapse clusters formed by `pairs`, returning how many records left.
    pub(crate) fn apply(
        &mut self,
        pairs: impl IntoIterator<Item = Pair>,
        keep_most_complete: bool,
    ) -> usize {
        let before = self.data.len();
        let clusters = components(before, pairs);
        let keep = survivors(&self.data, &clusters, keep_most_complete);
        self.data = self.data.select(&keep);
        before - self.data.len()
    }
}

/// Keep the columns of `subset` the dataset has, warning about the rest.
pub(crate) fn resolve_columns<S: AsRef<str>>(
    data: &Dataset,
    subset: &[S],
    operation: &'static str,
) -> Result<Vec<String>, DedupeError> {
    if subset.is_empty() {
        return Err(DedupeError::EmptyFieldList { operation });
    }
    let (valid, unknown): (Vec<String>, Vec<String>) = subset
        .iter()
        .map(|c| c.as_ref().to_string())
        .partition(|c| data.has_column(c));
    if !unknown.is_empty() {
        tracing::warn!(columns = ?unknown, operation, "ignoring columns not present in dataset");
    }
    if valid.is_empty() {
        return Err(DedupeError::NoValidColumns { requested: unknown });
    }
    Ok(valid)
}

fn require_columns<S: AsRef<str>>(
    data: &Dataset,
    column: &str,
    additional: &[S],
) -> Result<Vec<String>, DedupeError> {
    for name in std::iter::once(column).chain(additional.iter().map(AsRef::as_ref)) {
        if !data.has_column(name) {
            return Err(DedupeError::ColumnNotFound {
                column: name.to_string(),
            });
        }
    }
    Ok(additional.iter().map(|c| c.as_ref().to_string()).collect())
}

pub(crate) fn check_threshold(threshold: f64) -> Result<(), DedupeError> {
    if (0.0..=100.0).contains(&threshold) {
        Ok(())
    } else {
        Err(DedupeError::InvalidThreshold {
            name: "threshold",
            value: threshold,
        })
    }
}

/// Indices grouped by exact key, in first-seen order. Blank keys never group.
fn exact_groups<S: AsRef<str>>(data: &Dataset, subset: &[S]) -> Vec<Vec<usize>> {
    let mut slot_by_key: HashMap<RecordKey, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (index, record) in data.iter().enumerate() {
        let key = record_key(record, subset);
        if is_blank(&key) {
            continue;
        }
        let slot = *slot_by_key.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(index);
    }
    groups
}

/// Pairs linking every record to the first record sharing its key.
pub(crate) fn exact_pairs<S: AsRef<str>>(data: &Dataset, subset: &[S]) -> Vec<Pair> {
    exact_groups(data, subset)
        .into_iter()
        .flat_map(|group| {
            let first = group[0];
            group.into_iter().skip(1).map(move |other| (first, other))
        })
        .collect()
}

/// Every pair inside each exact group, so that `And` intersections with
/// other rules see all of them.
fn exact_pairs_complete(data: &Dataset, subset: &[String]) -> HashSet<Pair> {
    let mut pairs = HashSet::new();
    for group in exact_groups(data, subset) {
        for (i, &left) in group.iter().enumerate() {
            for &right in &group[i + 1..] {
                pairs.insert((left, right));
            }
        }
    }
    pairs
}

/// All pairs within each `additional` group whose `column` similarity
/// reaches `threshold`. Blank values never match.
fn fuzzy_pairs(data: &Dataset, column: &str, threshold: f64, additional: &[String]) -> Vec<Pair> {
    let mut groups: HashMap<RecordKey, Vec<(usize, String)>> = HashMap::new();
    for (index, record) in data.iter().enumerate() {
        let Some(text) = record.text(column) else {
            continue;
        };
        groups
            .entry(record_key(record, additional))
            .or_default()
            .push((index, normalize(&text)));
    }

    let mut pairs = Vec::new();
    for members in groups.values() {
        for (i, (left, left_text)) in members.iter().enumerate() {
            for (right, right_text) in &members[i + 1..] {
                if normalized_similarity(left_text, right_text) >= threshold {
                    pairs.push(ordered(*left, *right));
                }
            }
        }
    }
    pairs
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
