//! Blocked deduplication: known-answer cases and sequential/parallel agreement
//! on seeded synthetic data.

use leadscrape_core::{Dataset, Record};
use leadscrape_dedupe::{DedupeError, Deduplicator, LargeDatasetOptions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

const TEMPLATES: &[&str] = &[
    "Restaurante", "Café", "Hotel", "Tienda", "Farmacia", "Consultorio", "Estudio", "Taller",
    "Gimnasio", "Clínica",
];

const ADJECTIVES: &[&str] = &[
    "Central", "Del Centro", "Nuevo", "Viejo", "Moderno", "Tradicional", "Familiar",
    "Exclusivo", "Premium", "Económico", "Elegante", "Rústico",
];

const LOCATIONS: &[&str] = &[
    "Ciudad de México", "Guadalajara", "Monterrey", "Puebla", "Querétaro", "Mérida",
];

fn options(use_parallel: bool) -> LargeDatasetOptions {
    LargeDatasetOptions {
        match_fields: vec![
            "business_name".to_string(),
            "location".to_string(),
            "phone".to_string(),
        ],
        threshold: 80.0,
        use_parallel,
        batch_size: 64,
        keep_most_complete: false,
    }
}

fn synthetic(seed: u64, count: usize) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut records: Vec<Record> = Vec::with_capacity(count);
    while records.len() < count {
        let roll: f64 = rng.random();
        if roll < 0.3 && !records.is_empty() {
            let source = records[rng.random_range(0..records.len())].clone();
            records.push(source);
        } else if roll < 0.5 && !records.is_empty() {
            let mut variant = records[rng.random_range(0..records.len())].clone();
            if let Some(name) = variant.text("business_name") {
                variant.set("business_name", name.to_uppercase());
            }
            records.push(variant);
        } else {
            let name = format!(
                "{} {} {}",
                TEMPLATES[rng.random_range(0..TEMPLATES.len())],
                ADJECTIVES[rng.random_range(0..ADJECTIVES.len())],
                rng.random_range(1..500)
            );
            let location = LOCATIONS[rng.random_range(0..LOCATIONS.len())];
            let phone = format!("+52 55 {:04} {:04}", rng.random_range(0..10_000), rng.random_range(0..10_000));
            records.push(
                [
                    ("business_name", json!(name)),
                    ("location", json!(location)),
                    ("phone", json!(phone)),
                ]
                .into_iter()
                .collect(),
            );
        }
    }
    Dataset::from_records(records)
}

#[test]
fn known_duplicates_collapse() {
    let data = Dataset::from_json(json!([
        {"business_name": "Restaurante Central", "location": "CDMX", "phone": "5512345678"},
        {"business_name": "restaurante central", "location": "CDMX", "phone": "55-1234-5678"},
        {"business_name": "Restaurante Central", "location": "Guadalajara", "phone": "3312345678"},
        {"business_name": "Café Norte", "location": "Puebla", "phone": null},
        {"business_name": "Cafe Norte", "location": "Puebla", "phone": "2221234567"},
        {"business_name": "Hotel Sol", "location": "Cancún", "phone": "9981234567"}
    ]))
    .unwrap();

    let mut dedup = Deduplicator::new(data);
    let result = dedup.deduplicate_large_dataset(&options(false)).unwrap();
    let names: Vec<String> = result
        .iter()
        .filter_map(|r| r.text("business_name"))
        .collect();
    assert_eq!(
        names,
        vec!["Restaurante Central", "Restaurante Central", "Café Norte", "Hotel Sol"]
    );
}

#[test]
fn sequential_and_parallel_agree() {
    let data = synthetic(7, 1_500);

    let mut sequential = Deduplicator::new(data.clone());
    let seq = sequential
        .deduplicate_large_dataset(&options(false))
        .unwrap()
        .clone();

    let mut parallel = Deduplicator::new(data.clone());
    let par = parallel
        .deduplicate_large_dataset(&options(true))
        .unwrap()
        .clone();

    assert_eq!(seq.len(), par.len());
    assert_eq!(seq, par);
    assert!(seq.len() < data.len());
}

#[test]
fn exact_copies_are_always_removed() {
    let base = synthetic(11, 400);
    let mut doubled: Vec<Record> = base.records().to_vec();
    doubled.extend(base.records().iter().cloned());
    let data = Dataset::from_records(doubled);

    let mut single = Deduplicator::new(base);
    let expected = single.deduplicate_large_dataset(&options(true)).unwrap().len();

    let mut dedup = Deduplicator::new(data);
    let result = dedup.deduplicate_large_dataset(&options(true)).unwrap();
    assert_eq!(result.len(), expected);
}

#[test]
fn unknown_match_fields_are_rejected_when_none_remain() {
    let mut dedup = Deduplicator::new(synthetic(3, 10));
    let opts = LargeDatasetOptions {
        match_fields: vec!["nope".to_string()],
        ..options(false)
    };
    let err = dedup.deduplicate_large_dataset(&opts).unwrap_err();
    assert!(matches!(err, DedupeError::NoValidColumns { .. }));
}

#[test]
fn invalid_threshold_is_rejected() {
    let mut dedup = Deduplicator::new(synthetic(3, 10));
    let opts = LargeDatasetOptions {
        threshold: -1.0,
        ..options(false)
    };
    assert!(matches!(
        dedup.deduplicate_large_dataset(&opts),
        Err(DedupeError::InvalidThreshold { .. })
    ));
}
