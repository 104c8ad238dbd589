//! Pull contact values out of free text handed over by producers.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("valid email regex")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\(?\d[\d\s().-]{5,}\d").expect("valid phone regex"));

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"https?://(?:www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b[-a-zA-Z0-9()@:%_+.~#?&/=]*",
    )
    .expect("valid url regex")
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

/// Collapse whitespace runs to one space and trim.
#[must_use]
pub fn clean_text(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Lowercased email addresses in order of appearance.
#[must_use]
pub fn extract_emails(text: &str) -> Vec<String> {
    EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Phone-like spans with 7 to 15 digits, whitespace-normalised.
#[must_use]
pub fn extract_phone_numbers(text: &str) -> Vec<String> {
    PHONE_RE
        .find_iter(text)
        .map(|m| clean_text(m.as_str()))
        .filter(|candidate| {
            let digits = candidate.chars().filter(char::is_ascii_digit).count();
            (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits)
        })
        .collect()
}

/// `http(s)://` URLs in order of appearance.
#[must_use]
pub fn extract_urls(text: &str) -> Vec<String> {
    URL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
