// core/tests/test_config.rs
use std::path::PathBuf;

use effortrating_core::config::default_match_dates;
use effortrating_core::{EffortError, PipelineConfig};

#[test]
fn test_default_config() {
    let cfg = PipelineConfig::default();
    assert_eq!(cfg.data_folder, PathBuf::from("./processed_data"));
    assert_eq!(cfg.output_folder, PathBuf::from("./outputs"));
    assert!(cfg.schedule_path.is_none());
    assert_eq!(cfg.match_dates.len(), 6);
    assert_eq!(cfg.match_dates, default_match_dates());
    assert_eq!(cfg.athlete_age, 22);
}

#[test]
fn test_athlete_age_from_json() {
    let cfg = PipelineConfig::from_json(r#"{"athlete_age": 35}"#).unwrap();
    assert_eq!(cfg.athlete_age, 35);

    let err = PipelineConfig::from_json(r#"{"athlete_age": -1}"#).unwrap_err();
    match err {
        EffortError::Config { path, .. } => assert_eq!(path, "athlete_age"),
        other => panic!("uventet feil: {other}"),
    }
}

#[test]
fn test_partial_json_fills_defaults() {
    let cfg = PipelineConfig::from_json(r#"{"data_folder": "/data/season", "match_dates": ["2025-01-05"]}"#).unwrap();
    assert_eq!(cfg.data_folder, PathBuf::from("/data/season"));
    assert_eq!(cfg.output_folder, PathBuf::from("./outputs"));
    assert_eq!(cfg.match_dates.len(), 1);
}

#[test]
fn test_bad_field_reports_path() {
    let err = PipelineConfig::from_json(r#"{"match_dates": ["2024-10-09", "not-a-date"]}"#).unwrap_err();
    match err {
        EffortError::Config { path, .. } => assert_eq!(path, "match_dates[1]"),
        other => panic!("forventet Config-feil, fikk {other}"),
    }
}

#[test]
fn test_unknown_field_rejected() {
    // vekter er ikke konfigurerbare
    let err = PipelineConfig::from_json(r#"{"weights": {"steps": 0.5}}"#).unwrap_err();
    assert!(matches!(err, EffortError::Config { .. }));
}

#[test]
fn test_missing_config_file_gives_default() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = PipelineConfig::load(&tmp.path().join("effort_rating.json")).unwrap();
    assert_eq!(cfg, PipelineConfig::default());
}
