use super::*;

#[test]
fn parses_process_command() {
    let cli = Cli::try_parse_from([
        "leadscrape-cli",
        "process",
        "--input",
        "leads.json",
        "--source",
        "google_maps",
        "--report-dir",
        "reports",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Commands::Process {
            input,
            output,
            source,
            report_dir,
            export_dir,
            config,
        } => {
            assert_eq!(input, PathBuf::from("leads.json"));
            assert!(output.is_none());
            assert_eq!(source, "google_maps");
            assert_eq!(report_dir, Some(PathBuf::from("reports")));
            assert!(export_dir.is_none());
            assert!(config.is_none());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn process_source_defaults_to_cli() {
    let cli = Cli::try_parse_from(["leadscrape-cli", "process", "--input", "leads.json"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Process { source, .. } if source == "cli"));
}

#[test]
fn parses_dedupe_field_list() {
    let cli = Cli::try_parse_from([
        "leadscrape-cli",
        "dedupe",
        "--input",
        "leads.json",
        "--fields",
        "business_name,phone",
        "--threshold",
        "90",
        "--parallel",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Commands::Dedupe {
            fields,
            threshold,
            parallel,
            ..
        } => {
            assert_eq!(fields, vec!["business_name", "phone"]);
            assert!((threshold - 90.0).abs() < f64::EPSILON);
            assert!(parallel);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn dedupe_requires_fields() {
    assert!(Cli::try_parse_from(["leadscrape-cli", "dedupe", "--input", "leads.json"]).is_err());
}

#[test]
fn parses_check_phone_with_country() {
    let cli = Cli::try_parse_from([
        "leadscrape-cli",
        "check-phone",
        "55 1234 5678",
        "--country",
        "MX",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::CheckPhone { value, country: Some(country) }
            if value == "55 1234 5678" && country == "MX"
    ));
}

#[test]
fn parses_check_email() {
    let cli = Cli::try_parse_from(["leadscrape-cli", "check-email", "info@alphatech.com"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::CheckEmail { value } if value == "info@alphatech.com"));
}

#[test]
fn parses_process_export_dir() {
    let cli = Cli::try_parse_from([
        "leadscrape-cli",
        "process",
        "--input",
        "leads.json",
        "--export-dir",
        "exports",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Process { export_dir: Some(dir), .. } if dir == PathBuf::from("exports")
    ));
}

fn scratch_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join(format!("leadscrape-cli-{label}-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn config_file_sets_the_log_level() {
    let dir = scratch_dir("config");
    let path = dir.join("pipeline.yaml");
    std::fs::write(&path, "log_level: debug\nquality_alert_threshold: 40\n").unwrap();

    let settings = process::load_settings(Some(&path)).unwrap();
    assert_eq!(settings.log_level, "debug");
    assert!((settings.quality_alert_threshold - 40.0).abs() < f64::EPSILON);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn export_dir_attaches_a_json_exporter() {
    let dir = scratch_dir("export");
    let mut pipeline = process::build_pipeline(
        leadscrape_core::PipelineConfig::default(),
        None,
        Some(&dir),
    )
    .unwrap();
    let data = Dataset::from_json(serde_json::json!([
        {"business_name": "Alpha Tech", "phone": "+52 55 1234 5678", "email": "info@alphatech.com"}
    ]))
    .unwrap();

    let outcome = pipeline.run(data, "cli").unwrap();
    let receipt = outcome.export.expect("export should have run");
    assert_eq!(receipt.rows, 1);
    assert!(outcome.export_error.is_none());
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn no_export_dir_means_no_export() {
    let mut pipeline =
        process::build_pipeline(leadscrape_core::PipelineConfig::default(), None, None).unwrap();
    let data = Dataset::from_json(serde_json::json!([{"business_name": "Alpha Tech"}])).unwrap();
    let outcome = pipeline.run(data, "cli").unwrap();
    assert!(outcome.export.is_none());
}
