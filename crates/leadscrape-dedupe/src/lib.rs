//! Duplicate removal over a [`leadscrape_core::Dataset`].
//!
//! The [`Deduplicator`] keeps a working copy of the dataset plus a checkpoint
//! it can [`reset`](Deduplicator::reset) to. Every strategy reduces to a set
//! of duplicate index pairs; connected components over those pairs are the
//! duplicate clusters, and exactly one record survives per cluster.

mod cluster;
mod engine;
mod error;
mod keys;
mod large;
mod rules;
mod similarity;

pub use engine::{DeduplicationStats, Deduplicator};
pub use error::DedupeError;
pub use large::{LargeDatasetOptions, DEFAULT_BATCH_SIZE};
pub use rules::{default_rules, MatchRule, RuleOperator};
pub use similarity::similarity;
