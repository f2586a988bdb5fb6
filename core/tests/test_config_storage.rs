// core/tests/test_config_storage.rs
use std::fs;

use racesim_core::config::parse_config;
use racesim_core::{load_config, save_config, SimConfig, SimError};

#[test]
fn test_save_and_load_config() {
    let path = "tests/tmp_config_roundtrip.json";
    let _ = fs::remove_file(path);

    let mut config = SimConfig::default();
    config.num_laps = 19;
    config.seed = Some(1234);
    config.profile.exclude_pit_out_laps = true;
    config.profile.season_weights.weights.insert(2026, 5.0);

    save_config(&config, path).expect("save_config failed");
    let loaded = load_config(path).expect("load_config failed");

    assert_eq!(loaded, config);
    assert_eq!(loaded.profile.season_weights.weight(2026), 5.0);

    fs::remove_file(path).ok();
}

#[test]
fn missing_file_gives_defaults() {
    let loaded = load_config("tests/does_not_exist.json").unwrap();
    assert_eq!(loaded, SimConfig::default());
    assert_eq!(loaded.num_laps, 56);
    assert_eq!(loaded.profile.season_weights.weight(2025), 4.0);
    assert_eq!(loaded.profile.season_weights.weight(2022), 1.0);
    assert_eq!(loaded.profile.season_weights.weight(1999), 1.0);
}

#[test]
fn partial_json_fills_defaults() {
    let cfg = parse_config(r#"{"seed": 9}"#, "inline").unwrap();
    assert_eq!(cfg.seed, Some(9));
    assert_eq!(cfg.num_laps, 56);
    assert!(!cfg.profile.exclude_pit_out_laps);

    // egen tabell erstatter standardtabellen
    let cfg = parse_config(
        r#"{"profile": {"season_weights": {"weights": {"2024": 1.5}, "default_weight": 0.5}}}"#,
        "inline",
    )
    .unwrap();
    assert_eq!(cfg.profile.season_weights.weight(2024), 1.5);
    assert_eq!(cfg.profile.season_weights.weight(2025), 0.5);
}

#[test]
fn parse_error_names_the_field() {
    let err = parse_config(r#"{"num_laps": "many"}"#, "inline").unwrap_err();
    match err {
        SimError::ConfigParse { field, .. } => assert_eq!(field, "num_laps"),
        other => panic!("feil variant: {other:?}"),
    }
}

#[test]
fn invalid_values_are_rejected() {
    let err = parse_config(r#"{"num_laps": 0}"#, "inline").unwrap_err();
    assert!(matches!(err, SimError::InvalidLapCount(0)));

    let err = parse_config(
        r#"{"profile": {"season_weights": {"weights": {"2023": -2.0}}}}"#,
        "inline",
    )
    .unwrap_err();
    assert!(matches!(
        err,
        SimError::InvalidSeasonWeight { season: 2023, .. }
    ));

    let err = parse_config(
        r#"{"profile": {"season_weights": {"default_weight": -1.0}}}"#,
        "inline",
    )
    .unwrap_err();
    assert!(err.is_invalid_parameter());
}
