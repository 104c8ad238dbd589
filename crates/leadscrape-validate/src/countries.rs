//! Latin-American country phone profiles.

use leadscrape_core::{fields, Record};

/// Calling code and national-number length bounds for one country.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryProfile {
    /// ISO 3166-1 alpha-2 code.
    pub iso: &'static str,
    pub calling_code: &'static str,
    pub min_digits: usize,
    pub max_digits: usize,
    /// Lowercase names matched against free-text locations.
    pub names: &'static [&'static str],
}

impl CountryProfile {
    #[must_use]
    pub fn accepts_length(&self, digits: usize) -> bool {
        (self.min_digits..=self.max_digits).contains(&digits)
    }
}

const fn profile(
    iso: &'static str,
    calling_code: &'static str,
    min_digits: usize,
    max_digits: usize,
    names: &'static [&'static str],
) -> CountryProfile {
    CountryProfile {
        iso,
        calling_code,
        min_digits,
        max_digits,
        names,
    }
}

pub static COUNTRY_PROFILES: [CountryProfile; 20] = [
    profile("MX", "52", 10, 11, &["méxico", "mexico"]),
    profile("BR", "55", 10, 11, &["brasil", "brazil"]),
    profile("AR", "54", 10, 11, &["argentina"]),
    profile("CL", "56", 9, 9, &["chile"]),
    profile("CO", "57", 10, 10, &["colombia"]),
    profile("PE", "51", 8, 9, &["perú", "peru"]),
    profile("VE", "58", 10, 10, &["venezuela"]),
    profile("EC", "593", 8, 9, &["ecuador"]),
    profile("BO", "591", 8, 8, &["bolivia"]),
    profile("PY", "595", 9, 9, &["paraguay"]),
    profile("UY", "598", 8, 8, &["uruguay"]),
    profile("CR", "506", 8, 8, &["costa rica"]),
    profile("PA", "507", 7, 8, &["panamá", "panama"]),
    profile(
        "DO",
        "1",
        10,
        10,
        &["república dominicana", "republica dominicana", "dominican republic"],
    ),
    profile("GT", "502", 8, 8, &["guatemala"]),
    profile("HN", "504", 8, 8, &["honduras"]),
    profile("SV", "503", 8, 8, &["el salvador"]),
    profile("NI", "505", 8, 8, &["nicaragua"]),
    profile("CU", "53", 8, 8, &["cuba"]),
    profile("PR", "1", 10, 10, &["puerto rico"]),
];

/// Profile for an ISO alpha-2 code, case-insensitive.
#[must_use]
pub fn country_profile(iso: &str) -> Option<&'static CountryProfile> {
    let iso = iso.trim();
    COUNTRY_PROFILES
        .iter()
        .find(|p| p.iso.eq_ignore_ascii_case(iso))
}

/// Best-effort country guess from a free-text location.
///
/// This is a substring heuristic: the first profile whose name occurs in the
/// lowercased location wins. Compound locations naming several countries,
/// or names embedded in unrelated words, can resolve to the wrong profile.
#[must_use]
pub fn infer_country(location: &str) -> Option<&'static CountryProfile> {
    let location = location.to_lowercase();
    COUNTRY_PROFILES
        .iter()
        .find(|p| p.names.iter().any(|name| location.contains(name)))
}

/// ISO code inferred from the record's `location`, used as the phone hint.
#[must_use]
pub fn country_hint(record: &Record) -> Option<&'static str> {
    record
        .text(fields::LOCATION)
        .and_then(|location| infer_country(&location))
        .map(|profile| profile.iso)
}
