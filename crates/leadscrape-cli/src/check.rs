//! Single-value `check-email` / `check-phone` commands.

use leadscrape_validate::suspicious::{is_suspicious_email, is_suspicious_phone};
use leadscrape_validate::{
    format_email, format_phone_number, parse_phone_number, validate_email,
};
use serde_json::json;

use crate::write_json;

pub(crate) fn run_check_email(value: &str) -> anyhow::Result<()> {
    write_json(
        &json!({
            "input": value,
            "valid": validate_email(value),
            "formatted": format_email(value),
            "suspicious": is_suspicious_email(value),
        }),
        None,
    )
}

pub(crate) fn run_check_phone(value: &str, country: Option<&str>) -> anyhow::Result<()> {
    let parsed = parse_phone_number(value, country);
    write_json(
        &json!({
            "input": value,
            "country_hint": country,
            "valid": parsed.is_some(),
            "country": parsed.as_ref().and_then(|p| p.country).map(|c| c.iso),
            "formatted": format_phone_number(value, country),
            "suspicious": is_suspicious_phone(value),
        }),
        None,
    )
}
