//! Exact-match keys.
//!
//! Contact fields compare on a normalized form so that formatting noise does
//! not hide a duplicate: emails are lowercased and phones reduce to digits.
//! Every other field compares on its trimmed text, case preserved.

use leadscrape_core::{fields, Record};

pub(crate) type RecordKey = Vec<Option<String>>;

pub(crate) fn field_key(record: &Record, field: &str) -> Option<String> {
    let text = record.text(field)?;
    match field {
        fields::EMAIL => Some(text.to_lowercase()),
        fields::PHONE => {
            let digits: String = text.chars().filter(char::is_ascii_digit).collect();
            if digits.is_empty() {
                Some(text.to_lowercase())
            } else {
                Some(digits)
            }
        }
        _ => Some(text),
    }
}

pub(crate) fn record_key<S: AsRef<str>>(record: &Record, subset: &[S]) -> RecordKey {
    subset
        .iter()
        .map(|field| field_key(record, field.as_ref()))
        .collect()
}

/// Whether every key component is missing; such records never match exactly.
pub(crate) fn is_blank(key: &RecordKey) -> bool {
    key.iter().all(Option::is_none)
}
