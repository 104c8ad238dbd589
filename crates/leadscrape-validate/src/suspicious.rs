//! Placeholder and generated-looking contact values.

use std::sync::LazyLock;

use leadscrape_core::{fields, Record};
use regex::RegexSet;
use serde::{Deserialize, Serialize};

/// Addresses that look like placeholders or shared role inboxes.
static SUSPICIOUS_EMAIL: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"(?i)^test\d*@",
        r"(?i)^test@test\.com$",
        r"(?i)^admin@.*\.com$",
        r"(?i)^[^@]{1,3}@",
        r"(?i)^no-?reply@",
        r"(?i)^sales@",
        r"(?i)^contact@",
        r"(?i)@example\.",
        r"(?i)@test\.",
        r"(?i)^(fake|dummy|asdf|sample)\d*@",
    ])
    .expect("valid suspicious email patterns")
});

const MIN_REPEATED_RUN: usize = 6;
const MIN_SEQUENTIAL_RUN: usize = 6;
const MAX_LEADING_ZEROS: usize = 2;

/// Suspicious-pattern hits for one record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspiciousFlags {
    pub suspicious_email: bool,
    pub suspicious_phone: bool,
}

impl SuspiciousFlags {
    #[must_use]
    pub fn any(self) -> bool {
        self.suspicious_email || self.suspicious_phone
    }
}

/// Check the record's `email` and `phone` against the placeholder patterns.
#[must_use]
pub fn detect_suspicious(record: &Record) -> SuspiciousFlags {
    SuspiciousFlags {
        suspicious_email: record
            .text(fields::EMAIL)
            .is_some_and(|email| is_suspicious_email(&email)),
        suspicious_phone: record
            .text(fields::PHONE)
            .is_some_and(|phone| is_suspicious_phone(&phone)),
    }
}

#[must_use]
pub fn is_suspicious_email(email: &str) -> bool {
    SUSPICIOUS_EMAIL.is_match(email.trim())
}

/// Repeated digits (`555555`), a sequential run covering most of the number
/// (`1234567890`), or a run of leading zeros.
#[must_use]
pub fn is_suspicious_phone(phone: &str) -> bool {
    let digits: Vec<u8> = phone
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| b - b'0')
        .collect();
    if digits.is_empty() {
        return false;
    }

    let leading_zeros = digits.iter().take_while(|&&d| d == 0).count();
    if leading_zeros > MAX_LEADING_ZEROS {
        return true;
    }
    if longest_run(&digits, |a, b| a == b) >= MIN_REPEATED_RUN {
        return true;
    }

    let ascending = longest_run(&digits, |a, b| b == (a + 1) % 10);
    let descending = longest_run(&digits, |a, b| a == (b + 1) % 10);
    let sequential = ascending.max(descending);
    sequential >= MIN_SEQUENTIAL_RUN && sequential * 5 >= digits.len() * 4
}

/// Length of the longest stretch where every adjacent pair satisfies `step`.
fn longest_run(digits: &[u8], step: impl Fn(u8, u8) -> bool) -> usize {
    let mut best = 1;
    let mut current = 1;
    for pair in digits.windows(2) {
        if step(pair[0], pair[1]) {
            current += 1;
            best = best.max(current);
        } else {
            current = 1;
        }
    }
    best
}
