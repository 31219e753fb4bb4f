use std::fs;

use tempfile::tempdir;

use epg_core::EpgError;
use epg_model::ModelOptions;

#[test]
fn defaults_fill_missing_fields() {
    let options = ModelOptions::from_yaml(b"threshold: 0.001\n").unwrap();
    assert_eq!(options.threshold, 0.001);
    assert_eq!(options.parallel_threshold, 2048);
    assert_eq!(options.regular.initial_capacity, 100);
    assert_eq!(options.regular.growth_step, 100);
    assert_eq!(options.regular.gradient_tolerance, 1e-5);
    assert_eq!(options.discrete.bin_width, 1.0);
    assert_eq!(ModelOptions::from_json(b"{}").unwrap(), ModelOptions::default());
}

#[test]
fn options_round_trip_through_yaml() {
    let mut options = ModelOptions::default();
    options.threshold = 1e-6;
    options.regular.growth_step = 7;
    options.discrete.bin_width = 0.25;
    let text = options.to_yaml().unwrap();
    assert!(text.contains("growth_step: 7"));
    assert_eq!(ModelOptions::from_yaml(text.as_bytes()).unwrap(), options);
}

#[test]
fn options_load_from_yaml_and_json_files() {
    let dir = tempdir().unwrap();
    let yaml = dir.path().join("options.yaml");
    fs::write(
        &yaml,
        "parallel_threshold: 16\nregular:\n  growth_step: 32\ndiscrete:\n  bin_width: 2.5\n",
    )
    .unwrap();
    let options = ModelOptions::load(&yaml).unwrap();
    assert_eq!(options.parallel_threshold, 16);
    assert_eq!(options.regular.growth_step, 32);
    assert_eq!(options.regular.initial_capacity, 100);
    assert_eq!(options.discrete.bin_width, 2.5);

    let json = dir.path().join("options.json");
    fs::write(&json, serde_json::to_vec(&options).unwrap()).unwrap();
    assert_eq!(ModelOptions::load(&json).unwrap(), options);
}

#[test]
fn invalid_options_are_rejected() {
    let err = ModelOptions::from_yaml(b"threshold: -1.0\n").unwrap_err();
    assert!(matches!(err, EpgError::Parameter(_)));
    assert_eq!(err.info().context.get("option").map(String::as_str), Some("threshold"));

    let err = ModelOptions::from_yaml(b"regular:\n  growth_step: 0\n").unwrap_err();
    assert_eq!(err.info().code, "invalid-option");

    let err = ModelOptions::from_yaml(b"discrete:\n  bin_width: 0.0\n").unwrap_err();
    assert_eq!(
        err.info().context.get("option").map(String::as_str),
        Some("discrete.bin_width")
    );

    let err = ModelOptions::from_yaml(b"threshold: [1, 2]\n").unwrap_err();
    assert!(matches!(err, EpgError::Serde(_)));

    let dir = tempdir().unwrap();
    let err = ModelOptions::load(dir.path().join("missing.yaml")).unwrap_err();
    assert_eq!(err.info().code, "options-read");
}
