use super::*;
use crate::quality::IssueKind;
use leadscrape_core::{ConfigError, CoreError};

fn sample() -> Dataset {
    Dataset::from_json(json!([
        {
            "business_name": "Alpha Technologies",
            "phone": "+52 55 1234 5678",
            "email": "info@alphatech.com",
            "location": "Mexico City, Mexico",
            "website": "https://www.alphatech.com"
        },
        {
            "business_name": "Beta Services",
            "phone": "+55 11 91234-5678",
            "email": "contact@betaservices.com",
            "location": "São Paulo, Brazil",
            "website": "https://betaservices.com"
        },
        {
            "business_name": "Gamma Solutions",
            "phone": "123456",
            "email": "invalid.email",
            "location": "Buenos Aires, Argentina",
            "website": ""
        },
        {
            "business_name": "Test Company",
            "phone": "1234567890",
            "email": "test@test.com",
            "location": "",
            "website": "http://test-company.com"
        },
        {
            "business_name": "Delta Inc.",
            "phone": "+56 2 2345 6789",
            "email": "support@delta.com",
            "location": "Santiago, Chile",
            "website": "https://delta-inc.com"
        },
        {
            "business_name": "Epsilon",
            "phone": null,
            "email": null,
            "location": null,
            "website": null,
            "industry": "Retail"
        }
    ]))
    .unwrap()
}

fn processor() -> ValidationProcessor {
    ValidationProcessor::new(sample())
}

fn bool_column(data: &Dataset, column: &str) -> Vec<bool> {
    data.iter()
        .map(|r| r.get(column).and_then(Value::as_bool).unwrap_or(false))
        .collect()
}

fn text_column(data: &Dataset, column: &str) -> Vec<Option<String>> {
    data.iter().map(|r| r.text(column)).collect()
}

fn score_column(data: &Dataset) -> Vec<f64> {
    data.iter()
        .map(|r| r.get(fields::VALIDATION_SCORE).and_then(Value::as_f64).unwrap())
        .collect()
}

// -----------------------------------------------------------------------
// process
// -----------------------------------------------------------------------

#[test]
fn process_writes_validity_columns() {
    let out = processor().process();

    assert_eq!(
        bool_column(&out, fields::EMAIL_VALID),
        vec![true, true, false, true, true, false]
    );
    assert_eq!(
        bool_column(&out, fields::PHONE_VALID),
        vec![true, true, false, false, true, false]
    );
    assert_eq!(
        bool_column(&out, fields::IS_VALID),
        vec![true, true, false, false, true, true]
    );
}

#[test]
fn process_formats_valid_values_and_keeps_raw_otherwise() {
    let out = processor().process();

    assert_eq!(
        text_column(&out, fields::PHONE_FORMATTED),
        vec![
            Some("+52 55 1234 5678".to_string()),
            Some("+55 11 91234-5678".to_string()),
            Some("123456".to_string()),
            Some("1234567890".to_string()),
            Some("+56 2 2345 6789".to_string()),
            None,
        ]
    );
    assert_eq!(
        out.get(2).unwrap().text(fields::EMAIL_FORMATTED).as_deref(),
        Some("invalid.email")
    );
    assert_eq!(out.get(5).unwrap().get(fields::EMAIL_FORMATTED), None);
}

#[test]
fn process_scores_and_flags_every_record() {
    let out = processor().process();

    let scores = score_column(&out);
    // Every row is scored out of the 95 points its six columns carry.
    let expected = [94.74, 94.74, 31.58, 52.63, 94.74, 21.05];
    for (score, want) in scores.iter().zip(expected) {
        assert!((score - want).abs() < 1e-9, "got {scores:?}");
    }

    assert_eq!(
        bool_column(&out, fields::SUSPICIOUS),
        vec![false, true, true, true, false, false]
    );
    let flags = out.get(3).unwrap().get(fields::VALIDATION_FLAGS).unwrap();
    assert_eq!(
        flags,
        &json!({"suspicious_email": true, "suspicious_phone": true})
    );
}

#[test]
fn process_leaves_the_source_data_alone() {
    let p = processor();
    let before = p.data().clone();
    let first = p.process();
    let second = p.process();

    assert_eq!(p.data(), &before);
    assert_eq!(first, second);
    assert!(!p.data().get(0).unwrap().is_present(fields::VALIDATION_SCORE));
}

#[test]
fn process_is_idempotent() {
    let first = processor().process();
    let second = ValidationProcessor::new(first.clone()).process();

    for column in [
        fields::VALIDATION_SCORE,
        fields::IS_VALID,
        fields::EMAIL_VALID,
        fields::PHONE_VALID,
    ] {
        let before: Vec<_> = first.iter().map(|r| r.get(column).cloned()).collect();
        let after: Vec<_> = second.iter().map(|r| r.get(column).cloned()).collect();
        assert_eq!(before, after, "column {column} changed on the second pass");
    }
    assert_eq!(first, second);
}

#[test]
fn disabled_email_validation_writes_no_email_columns() {
    let config = ValidationConfig {
        enable_email_validation: false,
        ..ValidationConfig::default()
    };
    let p = processor().with_config(config);
    let out = p.process();

    assert!(out.iter().all(|r| r.get(fields::EMAIL_VALID).is_none()));
    assert!(out.iter().all(|r| r.get(fields::EMAIL_FORMATTED).is_none()));
    assert!(out.iter().all(|r| r.get(fields::PHONE_VALID).is_some()));
    // Row 2's bad email no longer counts against it; its phone still does.
    assert_eq!(
        bool_column(&out, fields::IS_VALID),
        vec![true, true, false, false, true, true]
    );
}

#[test]
fn custom_weights_flow_into_the_score() {
    let weights = ScoreWeights {
        business_name: 50.0,
        phone: 0.0,
        email: 0.0,
        location: 0.0,
        website: 0.0,
        industry: 50.0,
        description: 0.0,
    };
    let out = processor().with_weights(weights).process();
    let scores = score_column(&out);
    assert!((scores[0] - 50.0).abs() < 1e-9);
    assert!((scores[5] - 100.0).abs() < 1e-9);
}

// -----------------------------------------------------------------------
// single-field passes
// -----------------------------------------------------------------------

#[test]
fn validate_emails_adds_only_email_columns() {
    let out = processor().validate_emails();

    assert_eq!(
        bool_column(&out, fields::EMAIL_VALID),
        vec![true, true, false, true, true, false]
    );
    assert!(out.iter().all(|r| r.get(fields::PHONE_VALID).is_none()));
    assert!(out.iter().all(|r| r.get(fields::VALIDATION_SCORE).is_none()));
}

#[test]
fn validate_phone_numbers_adds_only_phone_columns() {
    let out = processor().validate_phone_numbers();

    assert_eq!(
        bool_column(&out, fields::PHONE_VALID),
        vec![true, true, false, false, true, false]
    );
    assert!(out.iter().all(|r| r.get(fields::EMAIL_VALID).is_none()));
    assert!(out.iter().all(|r| r.get(fields::IS_VALID).is_none()));
}

// -----------------------------------------------------------------------
// validate_record
// -----------------------------------------------------------------------

#[test]
fn validate_record_reports_formatted_values() {
    let p = processor();
    let result = p.validate_record(p.data().get(0).unwrap());

    assert!(result.is_valid);
    assert_eq!(result.formatted["email"], "info@alphatech.com");
    assert_eq!(result.formatted["phone"], "+52 55 1234 5678");
    assert!(result.validation_details["email_valid"]);
    assert!(result.validation_details["phone_valid"]);
    assert!(!result.flags.any());
    // Five keys, all earning: a missing industry does not count against it.
    assert!((result.score - 100.0).abs() < 1e-9);
}

#[test]
fn validate_record_reports_failures() {
    let p = processor();
    let result = p.validate_record(p.data().get(2).unwrap());

    assert!(!result.is_valid);
    assert!(result.formatted.is_empty());
    assert!(!result.validation_details["email_valid"]);
    assert!(!result.validation_details["phone_valid"]);
    assert!(result.flags.suspicious_phone);
}

#[test]
fn record_without_contact_fields_is_valid() {
    let p = processor();
    let result = p.validate_record(p.data().get(5).unwrap());

    assert!(result.is_valid);
    assert!(result.validation_details.is_empty());
    assert!((result.score - 21.05).abs() < 1e-9);
}

#[test]
fn flag_suspicious_data_matches_detector() {
    let p = processor();
    let flags = p.flag_suspicious_data(p.data().get(1).unwrap());
    assert!(flags.suspicious_email);
    assert!(!flags.suspicious_phone);
}

// -----------------------------------------------------------------------
// filtering and deduplication
// -----------------------------------------------------------------------

#[test]
fn filter_accepts_fractions_and_percentages() {
    let p = processor();

    assert_eq!(p.filter_by_quality_score(0.6).unwrap().len(), 3);
    assert_eq!(p.filter_by_quality_score(60.0).unwrap().len(), 3);
    assert_eq!(p.filter_by_quality_score(0.5).unwrap().len(), 4);
    assert_eq!(p.filter_by_quality_score(0.0).unwrap().len(), 6);
}

#[test]
fn filter_trusts_an_existing_score_column() {
    let data = Dataset::from_json(json!([
        {"business_name": "Scored Upstream", "validation_score": 95.0},
        {"business_name": "Scored Low", "validation_score": 10.0}
    ]))
    .unwrap();
    let kept = ValidationProcessor::new(data)
        .filter_by_quality_score(0.9)
        .unwrap();

    assert_eq!(kept.len(), 1);
    assert_eq!(
        kept.get(0).unwrap().text("business_name").as_deref(),
        Some("Scored Upstream")
    );
}

#[test]
fn filter_rejects_out_of_range_threshold() {
    let err = processor().filter_by_quality_score(150.0).unwrap_err();
    assert!(matches!(err, ValidationError::Config(ConfigError::Validation(_))));
}

#[test]
fn process_with_removes_duplicates_before_validating() {
    let mut data = sample();
    data.push(data.get(0).unwrap().clone());
    let out = ValidationProcessor::new(data)
        .process_with(&DeduplicationConfig::default())
        .unwrap();

    assert_eq!(out.len(), 6);
    assert!(out.iter().all(|r| r.get(fields::VALIDATION_SCORE).is_some()));
}

#[test]
fn process_with_unknown_column_fails() {
    let config = DeduplicationConfig {
        match_fields: vec!["tax_id".to_string()],
        ..DeduplicationConfig::default()
    };
    let err = processor().process_with(&config).unwrap_err();
    assert!(matches!(err, ValidationError::Dedupe(_)));
}

// -----------------------------------------------------------------------
// construction and quality assessment
// -----------------------------------------------------------------------

#[test]
fn from_json_requires_an_array_of_objects() {
    let err = ValidationProcessor::from_json(json!({"business_name": "Alpha"})).unwrap_err();
    assert!(matches!(err, ValidationError::Core(CoreError::NotTabular { .. })));

    let p = ValidationProcessor::from_json(json!([{"business_name": "Alpha"}])).unwrap();
    assert_eq!(p.data().len(), 1);
}

#[test]
fn assess_data_quality_uses_the_monitor() {
    let mut monitor = QualityMonitor::with_defaults().unwrap();
    let p = processor();
    let assessment = p.assess_data_quality(&mut monitor, "demo");

    assert_eq!(assessment.records_processed, 6);
    assert!(assessment.issues.iter().any(|i| i.kind == IssueKind::InvalidFormat
        && i.field.as_deref() == Some("email")
        && i.record_index == Some(2)));
    assert!(assessment.issues.iter().any(|i| i.kind == IssueKind::MissingRequired
        && i.record_index == Some(5)));
    assert_eq!(monitor.history("demo").len(), 1);
}
