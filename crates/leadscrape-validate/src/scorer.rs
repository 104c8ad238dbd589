//! Weighted per-record completeness and validity score.

use leadscrape_core::{fields, Record};
use serde::{Deserialize, Serialize};

use crate::countries::country_hint;
use crate::email::validate_email;
use crate::phone::validate_phone_number;

pub const W_BUSINESS_NAME: u32 = 15;
pub const W_PHONE: u32 = 25;
pub const W_EMAIL: u32 = 25;
pub const W_LOCATION: u32 = 15;
pub const W_WEBSITE: u32 = 10;
pub const W_INDUSTRY: u32 = 5;
pub const W_DESCRIPTION: u32 = 5;

const _: () = assert!(
    W_BUSINESS_NAME + W_PHONE + W_EMAIL + W_LOCATION + W_WEBSITE + W_INDUSTRY + W_DESCRIPTION
        == 100,
    "default score weights must sum to 100"
);

/// Weight per scored field. Zero removes a field from the score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub business_name: f64,
    pub phone: f64,
    pub email: f64,
    pub location: f64,
    pub website: f64,
    pub industry: f64,
    pub description: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            business_name: f64::from(W_BUSINESS_NAME),
            phone: f64::from(W_PHONE),
            email: f64::from(W_EMAIL),
            location: f64::from(W_LOCATION),
            website: f64::from(W_WEBSITE),
            industry: f64::from(W_INDUSTRY),
            description: f64::from(W_DESCRIPTION),
        }
    }
}

/// Score `record` on a 0–100 scale, rounded to two decimals.
///
/// Presence earns the weight for name, location, industry, and description;
/// phone and email must validate (the phone against the country inferred
/// from `location`); the website must be an `http(s)://` URL.
///
/// Only fields the record carries as keys count toward the total, so a
/// record without a `description` key can still reach 100. A key holding
/// `null` is counted and earns nothing.
#[must_use]
pub fn calculate_quality_score(record: &Record, weights: &ScoreWeights) -> f64 {
    score_with_keys(record, weights, |field| record.has_key(field))
}

/// [`calculate_quality_score`] for a dataset row: every column of the
/// dataset counts as a key of the row, whether or not the record set it.
pub(crate) fn calculate_row_score(
    record: &Record,
    weights: &ScoreWeights,
    columns: &[String],
) -> f64 {
    score_with_keys(record, weights, |field| {
        record.has_key(field) || columns.iter().any(|c| c == field)
    })
}

fn score_with_keys(
    record: &Record,
    weights: &ScoreWeights,
    has_key: impl Fn(&str) -> bool,
) -> f64 {
    let hint = country_hint(record);
    let checks = [
        (fields::BUSINESS_NAME, weights.business_name, record.is_present(fields::BUSINESS_NAME)),
        (
            fields::PHONE,
            weights.phone,
            record
                .text(fields::PHONE)
                .is_some_and(|phone| validate_phone_number(&phone, hint)),
        ),
        (
            fields::EMAIL,
            weights.email,
            record
                .text(fields::EMAIL)
                .is_some_and(|email| validate_email(&email)),
        ),
        (fields::LOCATION, weights.location, record.is_present(fields::LOCATION)),
        (
            fields::WEBSITE,
            weights.website,
            record.text(fields::WEBSITE).is_some_and(|url| {
                let url = url.to_ascii_lowercase();
                url.starts_with("http://") || url.starts_with("https://")
            }),
        ),
        (fields::INDUSTRY, weights.industry, record.is_present(fields::INDUSTRY)),
        (fields::DESCRIPTION, weights.description, record.is_present(fields::DESCRIPTION)),
    ];

    let (earned, total) = checks
        .iter()
        .filter(|(field, _, _)| has_key(field))
        .fold((0.0, 0.0), |(earned, total), &(_, weight, passed)| {
            (if passed { earned + weight } else { earned }, total + weight)
        });
    if total <= 0.0 {
        return 0.0;
    }

    round2((earned / total * 100.0).clamp(0.0, 100.0))
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
