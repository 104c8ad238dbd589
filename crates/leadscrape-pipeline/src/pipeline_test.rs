use super::*;
use crate::{ExportError, JsonFileExporter};
use leadscrape_core::{DeduplicationConfig, QualityThreshold, ValidationConfig};
use leadscrape_validate::{IssueKind, ValidationError};
use serde_json::{json, Value};

fn batch() -> Dataset {
    Dataset::from_json(json!([
        {
            "business_name": "Alpha Technologies",
            "phone": "+52 55 1234 5678",
            "email": "info@alphatech.com",
            "location": "Mexico City, Mexico",
            "website": "https://www.alphatech.com",
            "source": "google_maps"
        },
        {
            "business_name": "  Alpha Technologies ",
            "phone": "+52 55 1234 5678",
            "email": "info@alphatech.com",
            "location": "Mexico City, Mexico",
            "website": "https://www.alphatech.com",
            "source": "google_maps"
        },
        {
            "business_name": "Gamma Solutions",
            "phone": "123456",
            "email": "invalid.email",
            "location": "Buenos Aires, Argentina",
            "source": "google_maps"
        },
        {
            "business_name": "",
            "phone": "+56 2 2345 6789",
            "email": "ventas@sinnombre.cl",
            "source": "google_maps"
        },
        {"business_name": null, "phone": null, "email": null, "source": null}
    ]))
    .unwrap()
}

fn pipeline(config: PipelineConfig) -> LeadPipeline {
    LeadPipeline::new(config).unwrap()
}

struct RejectingExporter;

impl Exporter for RejectingExporter {
    fn name(&self) -> &str {
        "sheets"
    }

    fn export(&self, _data: &Dataset) -> Result<ExportReceipt, ExportError> {
        Err(ExportError::Rejected {
            exporter: "sheets".to_string(),
            reason: "quota exceeded".to_string(),
        })
    }
}

// -----------------------------------------------------------------------
// run
// -----------------------------------------------------------------------

#[test]
fn run_cleans_validates_and_stamps() {
    let mut p = pipeline(PipelineConfig::default());
    let outcome = p.run(batch(), "google_maps").unwrap();

    // Trimmed copy of row 0 collapses, blank rows and the nameless row go.
    assert_eq!(outcome.data.len(), 2);
    for record in outcome.data.iter() {
        assert!(record.get(fields::VALIDATION_SCORE).is_some());
        assert!(record.get(fields::IS_VALID).is_some());
        assert!(record.text(fields::PROCESSED_AT).is_some());
    }
    let alpha = outcome.data.get(0).unwrap();
    assert_eq!(alpha.get(fields::IS_VALID), Some(&json!(true)));
    assert_eq!(
        alpha.text(fields::PHONE_FORMATTED).as_deref(),
        Some("+52 55 1234 5678")
    );

    let stages: Vec<&str> = outcome.context.stages.iter().map(|s| s.stage).collect();
    assert_eq!(stages, vec!["clean", "identity", "validate", "assess", "filter"]);
    assert_eq!(outcome.context.stage("clean").map(|s| s.records_out), Some(3));
    assert_eq!(outcome.context.stage("identity").map(|s| s.records_out), Some(2));
    assert!(outcome.export.is_none());
    assert!(outcome.export_error.is_none());
    assert_eq!(p.monitor().history("google_maps").len(), 1);
}

#[test]
fn min_quality_filters_low_scores() {
    let config = PipelineConfig {
        validation: ValidationConfig {
            min_data_quality: QualityThreshold::new(0.6).unwrap(),
            ..ValidationConfig::default()
        },
        ..PipelineConfig::default()
    };
    let outcome = pipeline(config).run(batch(), "google_maps").unwrap();

    assert_eq!(outcome.data.len(), 1);
    assert_eq!(
        outcome.data.get(0).unwrap().text(fields::BUSINESS_NAME).as_deref(),
        Some("Alpha Technologies")
    );
    assert_eq!(outcome.context.stage("filter").map(|s| s.records_in), Some(2));
}

#[test]
fn low_quality_raises_an_alert_without_failing() {
    let config = PipelineConfig {
        quality_alert_threshold: 100.0,
        ..PipelineConfig::default()
    };
    let outcome = pipeline(config).run(batch(), "google_maps").unwrap();

    assert!(outcome.assessment.quality_score < 100.0);
    assert_eq!(outcome.context.alerts.len(), 1);
    assert_eq!(outcome.context.alerts[0].source, "google_maps");
    assert_eq!(outcome.data.len(), 2);
}

#[test]
fn zero_alert_threshold_never_alerts() {
    let config = PipelineConfig {
        quality_alert_threshold: 0.0,
        ..PipelineConfig::default()
    };
    let outcome = pipeline(config).run(batch(), "google_maps").unwrap();
    assert!(outcome.context.alerts.is_empty());
}

#[test]
fn empty_batch_runs_to_completion() {
    let outcome = pipeline(PipelineConfig::default())
        .run(Dataset::new(), "cylex")
        .unwrap();

    assert!(outcome.data.is_empty());
    assert_eq!(outcome.assessment.issues[0].kind, IssueKind::EmptyDataset);
    assert_eq!(outcome.context.alerts.len(), 1);
}

// -----------------------------------------------------------------------
// export
// -----------------------------------------------------------------------

#[test]
fn export_failure_is_reported_not_raised() {
    let mut p = pipeline(PipelineConfig::default()).with_exporter(RejectingExporter);
    let outcome = p.run(batch(), "google_maps").unwrap();

    assert_eq!(outcome.data.len(), 2);
    assert!(outcome.export.is_none());
    let failure = outcome.export_error.unwrap();
    assert_eq!(failure.exporter, "sheets");
    assert!(failure.message.contains("quota exceeded"));
    assert!(outcome.context.stage("export").is_some());
}

#[test]
fn successful_export_returns_a_receipt() {
    let dir = std::env::temp_dir().join(format!("leadscrape-pipeline-{}", uuid::Uuid::new_v4()));
    let mut p = pipeline(PipelineConfig::default()).with_exporter(JsonFileExporter::new(&dir));
    let outcome = p.run(batch(), "google_maps").unwrap();

    let receipt = outcome.export.unwrap();
    assert_eq!(receipt.rows, 2);
    let body: Value =
        serde_json::from_str(&std::fs::read_to_string(&receipt.destination).unwrap()).unwrap();
    // Header plus two rows.
    assert_eq!(body.as_array().map(Vec::len), Some(3));

    std::fs::remove_dir_all(&dir).unwrap();
}

// -----------------------------------------------------------------------
// configuration
// -----------------------------------------------------------------------

#[test]
fn invalid_config_is_rejected_up_front() {
    let config = PipelineConfig {
        deduplication: DeduplicationConfig {
            fuzzy_threshold: 150.0,
            ..DeduplicationConfig::default()
        },
        ..PipelineConfig::default()
    };
    assert!(matches!(
        LeadPipeline::new(config),
        Err(PipelineError::Config(_))
    ));
}

#[test]
fn fuzzy_field_missing_from_data_fails_the_run() {
    let config = PipelineConfig {
        deduplication: DeduplicationConfig {
            fuzzy_match: true,
            fuzzy_fields: vec!["trade_name".to_string()],
            ..DeduplicationConfig::default()
        },
        ..PipelineConfig::default()
    };
    let err = pipeline(config).run(batch(), "google_maps").unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::Dedupe(_))
    ));
}
