use rapidfuzz::fuzz;

/// String similarity on a 0–100 scale.
///
/// Both inputs are lowercased with whitespace collapsed, then compared by
/// Indel ratio (twice the matched characters over the combined length) both
/// as-is and with their tokens sorted; the higher of the two ratios wins.
/// Two blank strings are identical.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    normalized_similarity(&a, &b)
}

/// [`similarity`] for inputs already passed through [`normalize`].
pub(crate) fn normalized_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 100.0;
    }
    let direct = fuzz::ratio(a.chars(), b.chars());
    let (a, b) = (token_sort(a), token_sort(b));
    let sorted = fuzz::ratio(a.chars(), b.chars());
    direct.max(sorted) * 100.0
}

pub(crate) fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn token_sort(value: &str) -> String {
    let mut tokens: Vec<&str> = value.split(' ').collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_and_spacing_do_not_matter() {
        assert!((similarity("Alpha Tech", "  ALPHA   tech ") - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn suffix_lowers_the_ratio() {
        // 26 matched characters over 30.
        let score = similarity("Test Business", "Test Business Inc");
        assert!((score - 86.666_666).abs() < 1e-3, "got {score}");
        assert!(score < 95.0);
    }

    #[test]
    fn short_suffix_clears_the_default_threshold() {
        let score = similarity("Alpha Tech", "Alpha Tech Inc");
        assert!((score - 83.333_333).abs() < 1e-3, "got {score}");
        assert!(score >= 80.0);
    }

    #[test]
    fn one_blank_side_scores_zero() {
        assert!(similarity("Alpha Tech", "").abs() < f64::EPSILON);
    }

    #[test]
    fn token_order_is_ignored() {
        assert!((similarity("Tech Alpha", "alpha tech") - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unrelated_names_score_low() {
        assert!(similarity("Gamma Solutions", "Beta Services") < 50.0);
    }

    #[test]
    fn blank_inputs_are_identical() {
        assert!((similarity("", "   ") - 100.0).abs() < f64::EPSILON);
    }
}
