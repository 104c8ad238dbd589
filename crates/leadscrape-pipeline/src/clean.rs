//! Cleaning pass run before deduplication and validation.

use std::collections::HashSet;

use leadscrape_core::{fields, Dataset};
use serde_json::Value;

/// Trim every string cell, then drop records with no usable value and
/// records identical on every column to an earlier one.
pub fn clean_dataset(data: &mut Dataset) {
    data.update_records(|record| {
        for (_, value) in record.fields_mut() {
            if let Value::String(s) = value {
                let trimmed = s.trim();
                if trimmed.len() != s.len() {
                    *s = trimmed.to_string();
                }
            }
        }
    });

    data.retain(|record| record.fields().any(|(name, _)| record.is_present(name)));

    let columns = data.columns().to_vec();
    let mut seen = HashSet::new();
    data.retain(|record| {
        let row: Vec<Value> = columns
            .iter()
            .map(|c| record.get(c).cloned().unwrap_or(Value::Null))
            .collect();
        seen.insert(Value::Array(row).to_string())
    });
}

/// Drop records without a `business_name`. Returns how many were removed.
pub fn drop_missing_identity(data: &mut Dataset) -> usize {
    let before = data.len();
    data.retain(|record| record.is_present(fields::BUSINESS_NAME));
    before - data.len()
}
