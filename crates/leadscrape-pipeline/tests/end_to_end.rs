//! Full pipeline over a small multi-source batch.

use leadscrape_core::{fields, Dataset, DeduplicationConfig, PipelineConfig};
use leadscrape_pipeline::{to_sheet_rows, LeadPipeline, SheetCell};
use serde_json::json;

fn multi_source_batch() -> Dataset {
    Dataset::from_json(json!([
        {"business_name": "Test Business", "phone": "555-123-4567", "email": "info@test.com", "source": "google_maps"},
        {"business_name": "Test Business", "phone": "555-123-4567", "email": "info@test.com", "source": "paginas_amarillas"},
        {"business_name": "Test Business Inc", "phone": "5551234567", "email": "info@test.com", "source": "guialocal"},
        {"business_name": "Another Business", "phone": "555-987-6543", "email": "contact@another.com", "source": "instagram"},
        {"business_name": "Another Business", "phone": "555-987-6543", "email": "contact@another.com", "source": "cylex"}
    ]))
    .unwrap()
}

fn config() -> PipelineConfig {
    PipelineConfig {
        deduplication: DeduplicationConfig {
            exact_match: true,
            fuzzy_match: true,
            fuzzy_threshold: 95.0,
            ..DeduplicationConfig::default()
        },
        ..PipelineConfig::default()
    }
}

#[test]
fn duplicates_across_sources_collapse_to_three() {
    let mut pipeline = LeadPipeline::new(config()).unwrap();
    let outcome = pipeline.run(multi_source_batch(), "multi").unwrap();

    assert_eq!(outcome.data.len(), 3);
    let names: Vec<String> = outcome
        .data
        .iter()
        .filter_map(|r| r.text(fields::BUSINESS_NAME))
        .collect();
    assert_eq!(
        names,
        vec!["Test Business", "Test Business Inc", "Another Business"]
    );
    // The first occurrence of each cluster survives.
    let sources: Vec<String> = outcome
        .data
        .iter()
        .filter_map(|r| r.text(fields::SOURCE))
        .collect();
    assert_eq!(sources, vec!["google_maps", "guialocal", "instagram"]);

    let validate = outcome.context.stage("validate").unwrap();
    assert_eq!((validate.records_in, validate.records_out), (5, 3));
}

#[test]
fn processed_output_flattens_for_export() {
    let mut pipeline = LeadPipeline::new(config()).unwrap();
    let outcome = pipeline.run(multi_source_batch(), "multi").unwrap();
    let rows = to_sheet_rows(&outcome.data);

    assert_eq!(rows.len(), 4);
    let header: Vec<&SheetCell> = rows[0].iter().collect();
    for column in [
        fields::VALIDATION_SCORE,
        fields::VALIDATION_FLAGS,
        fields::IS_VALID,
        fields::PROCESSED_AT,
    ] {
        assert!(
            header.contains(&&SheetCell::Text(column.to_string())),
            "missing {column}"
        );
    }
    for row in &rows[1..] {
        assert_eq!(row.len(), rows[0].len());
    }
}

#[test]
fn monitor_history_accumulates_across_runs() {
    let mut pipeline = LeadPipeline::new(config()).unwrap();
    pipeline.run(multi_source_batch(), "multi").unwrap();
    pipeline.run(multi_source_batch(), "multi").unwrap();

    assert_eq!(pipeline.monitor().history("multi").len(), 2);
    let report = pipeline.monitor().generate_report(Some("multi"));
    assert!(report.trends["multi"].abs() < 1e-9);
}
