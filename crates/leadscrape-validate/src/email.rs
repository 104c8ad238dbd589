//! Email syntax validation and canonical formatting.

use std::net::Ipv4Addr;

const MAX_LOCAL_LEN: usize = 64;
const MAX_DOMAIN_LEN: usize = 255;
const MAX_LABEL_LEN: usize = 63;

/// Generic and Latin-American top-level domains accepted outright.
const ALLOWED_TLDS: &[&str] = &[
    "com", "net", "org", "edu", "gov", "mil", "int", "info", "biz", "io", "app", "dev", "tech",
    "online", "site", "store", "shop", "cloud", "digital", "agency", "company", "business",
    "email", "mx", "br", "ar", "cl", "co", "pe", "ve", "ec", "bo", "py", "uy", "cr", "pa", "do",
    "gt", "hn", "sv", "ni", "cu", "pr", "lat",
];

/// Currently assigned ISO 3166-1 alpha-2 codes.
const ISO_COUNTRY_CODES: &[&str] = &[
    "ad", "ae", "af", "ag", "ai", "al", "am", "ao", "aq", "ar", "as", "at", "au", "aw", "ax",
    "az", "ba", "bb", "bd", "be", "bf", "bg", "bh", "bi", "bj", "bl", "bm", "bn", "bo", "bq",
    "br", "bs", "bt", "bv", "bw", "by", "bz", "ca", "cc", "cd", "cf", "cg", "ch", "ci", "ck",
    "cl", "cm", "cn", "co", "cr", "cu", "cv", "cw", "cx", "cy", "cz", "de", "dj", "dk", "dm",
    "do", "dz", "ec", "ee", "eg", "eh", "er", "es", "et", "fi", "fj", "fk", "fm", "fo", "fr",
    "ga", "gb", "gd", "ge", "gf", "gg", "gh", "gi", "gl", "gm", "gn", "gp", "gq", "gr", "gs",
    "gt", "gu", "gw", "gy", "hk", "hm", "hn", "hr", "ht", "hu", "id", "ie", "il", "im", "in",
    "io", "iq", "ir", "is", "it", "je", "jm", "jo", "jp", "ke", "kg", "kh", "ki", "km", "kn",
    "kp", "kr", "kw", "ky", "kz", "la", "lb", "lc", "li", "lk", "lr", "ls", "lt", "lu", "lv",
    "ly", "ma", "mc", "md", "me", "mf", "mg", "mh", "mk", "ml", "mm", "mn", "mo", "mp", "mq",
    "mr", "ms", "mt", "mu", "mv", "mw", "mx", "my", "mz", "na", "nc", "ne", "nf", "ng", "ni",
    "nl", "no", "np", "nr", "nu", "nz", "om", "pa", "pe", "pf", "pg", "ph", "pk", "pl", "pm",
    "pn", "pr", "ps", "pt", "pw", "py", "qa", "re", "ro", "rs", "ru", "rw", "sa", "sb", "sc",
    "sd", "se", "sg", "sh", "si", "sj", "sk", "sl", "sm", "sn", "so", "sr", "ss", "st", "sv",
    "sx", "sy", "sz", "tc", "td", "tf", "tg", "th", "tj", "tk", "tl", "tm", "tn", "to", "tr",
    "tt", "tv", "tw", "tz", "ua", "ug", "um", "us", "uy", "uz", "va", "vc", "ve", "vg", "vi",
    "vn", "vu", "wf", "ws", "ye", "yt", "za", "zm", "zw",
];

/// Whether `value` is a syntactically valid email address.
///
/// Surrounding whitespace is ignored. The local part must be 1–64 atext
/// characters without leading, trailing, or doubled dots. The domain is
/// either an IPv4 literal (bare or bracketed) or at least two dot-separated
/// labels whose last label is an accepted TLD.
#[must_use]
pub fn validate_email(value: &str) -> bool {
    let value = value.trim();
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    valid_local_part(local) && valid_domain(domain)
}

/// Trim and lowercase both halves of an address, then re-validate.
///
/// Returns `None` when the result is not a valid address.
#[must_use]
pub fn format_email(value: &str) -> Option<String> {
    let (local, domain) = value.trim().rsplit_once('@')?;
    let formatted = format!(
        "{}@{}",
        local.trim().to_lowercase(),
        domain.trim().to_lowercase()
    );
    validate_email(&formatted).then_some(formatted)
}

fn valid_local_part(local: &str) -> bool {
    if local.is_empty() || local.len() > MAX_LOCAL_LEN {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    local.chars().all(is_atext)
}

fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || "!#$%&'*+/=?^_`{|}~-".contains(c)
}

fn valid_domain(domain: &str) -> bool {
    let literal = domain
        .strip_prefix('[')
        .and_then(|d| d.strip_suffix(']'))
        .unwrap_or(domain);
    if is_ipv4_literal(literal) {
        return true;
    }
    if domain.is_empty() || domain.len() > MAX_DOMAIN_LEN {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || !labels.iter().all(|l| valid_label(l)) {
        return false;
    }
    labels.last().is_some_and(|tld| valid_tld(tld))
}

fn is_ipv4_literal(value: &str) -> bool {
    value.split('.').count() == 4
        && value.split('.').all(|part| !part.is_empty() && part.len() <= 3)
        && value.parse::<Ipv4Addr>().is_ok()
}

fn valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn valid_tld(tld: &str) -> bool {
    let tld = tld.to_ascii_lowercase();
    ALLOWED_TLDS.contains(&tld.as_str())
        || ISO_COUNTRY_CODES.contains(&tld.as_str())
        || (tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------
    // validate_email
    // -------------------------------------------------------------------

    #[test]
    fn accepts_common_addresses() {
        for email in [
            "info@alphatech.com",
            "user.name+tag@example.com",
            "user.name+tag@example.co.uk",
            "email@subdomain.example.co",
            "ventas@empresa.com.mx",
            "contacto@negocio.lat",
        ] {
            assert!(validate_email(email), "{email} should be valid");
        }
    }

    #[test]
    fn accepts_ipv4_domains() {
        assert!(validate_email("email@123.123.123.123"));
        assert!(validate_email("email@[123.123.123.123]"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in [
            "plainaddress",
            "email@example",
            "@example.com",
            "@missing-username.com",
            "email@example..com",
            ".email@example.com",
            "email.@example.com",
            "em..ail@example.com",
            "email@-example.com",
            "email@example.c0m",
            "email@example.c",
            "two@@example.com",
            "with space@example.com",
            "",
        ] {
            assert!(!validate_email(email), "{email:?} should be invalid");
        }
    }

    #[test]
    fn rejects_overlong_parts() {
        let local = "a".repeat(65);
        assert!(!validate_email(&format!("{local}@example.com")));
        let label = "b".repeat(64);
        assert!(!validate_email(&format!("user@{label}.com")));
    }

    #[test]
    fn ignores_surrounding_whitespace() {
        assert!(validate_email("  info@alphatech.com  "));
    }

    // -------------------------------------------------------------------
    // format_email
    // -------------------------------------------------------------------

    #[test]
    fn format_lowercases_and_trims() {
        assert_eq!(
            format_email(" Info@AlphaTech.COM ").as_deref(),
            Some("info@alphatech.com")
        );
        assert_eq!(
            format_email("USER.NAME@EXAMPLE.COM").as_deref(),
            Some("user.name@example.com")
        );
    }

    #[test]
    fn format_rejects_invalid_input() {
        assert_eq!(format_email("invalid-email"), None);
        assert_eq!(format_email(""), None);
        assert_eq!(format_email("email@example"), None);
    }
}
