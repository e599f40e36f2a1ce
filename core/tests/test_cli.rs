// core/tests/test_cli.rs
use std::fs;

use chrono::NaiveDate;
use clap::Parser;
use effortrating_core::cli::{resolve_plan, run, Args};
use effortrating_core::storage::record_path;
use effortrating_core::substitution::recommendations_path;
use effortrating_core::telemetry::FailureStage;
use effortrating_core::{load_effort_record, telemetry, PipelineConfig};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn test_explicit_dates_win() {
    let tmp = tempfile::tempdir().unwrap();
    let schedule = tmp.path().join("schedule.csv");
    fs::write(&schedule, "date\n01/02/2025\n").unwrap();

    let args = Args::parse_from([
        "effort-rating",
        "--schedule",
        schedule.to_str().unwrap(),
        "--date",
        "2025-03-01",
    ]);
    let plan = resolve_plan(&args, PipelineConfig::default()).unwrap();
    assert_eq!(plan.dates, vec![date("2025-03-01")]);
    assert_eq!(plan.schedule.len(), 1);
}

#[test]
fn test_schedule_beats_config_list() {
    let tmp = tempfile::tempdir().unwrap();
    let schedule = tmp.path().join("schedule.csv");
    fs::write(&schedule, "date\n01/02/2025\n08/02/2025\n").unwrap();

    let args = Args::parse_from(["effort-rating", "--schedule", schedule.to_str().unwrap()]);
    let plan = resolve_plan(&args, PipelineConfig::default()).unwrap();
    assert_eq!(plan.dates, vec![date("2025-02-01"), date("2025-02-08")]);
}

#[test]
fn test_config_list_is_fallback() {
    let args = Args::parse_from(["effort-rating", "--data", "/tmp/nowhere"]);
    let plan = resolve_plan(&args, PipelineConfig::default()).unwrap();
    assert_eq!(plan.dates, PipelineConfig::default().match_dates);
    assert_eq!(plan.config.data_folder.to_str(), Some("/tmp/nowhere"));
}

#[test]
fn test_run_writes_one_record_per_rated_match() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    for (d, cal) in [("2024-10-09", "500"), ("2024-10-16", "900")] {
        let dir = data.path().join(format!("match_{d}"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("calories.csv"), format!("calories\n{cal}\n")).unwrap();
    }

    let args = Args::parse_from([
        "effort-rating",
        "--data",
        data.path().to_str().unwrap(),
        "--output",
        out.path().to_str().unwrap(),
        "--date",
        "2024-10-09",
        "--date",
        "2024-10-16",
        "--date",
        "2024-10-30",
    ]);
    let plan = resolve_plan(&args, PipelineConfig::default()).unwrap();
    let outcome = run(&plan);
    let report = &outcome.report;

    assert_eq!(report.ratings.len(), 2);
    assert_eq!(outcome.written.len(), 2);
    assert!(outcome.write_failures.is_empty());
    // Uten sesongplan er det ikke noe kampvindu å analysere.
    assert!(outcome.substitutions.written.is_empty());
    assert_eq!(report.skipped, vec![date("2024-10-30")]);
    assert!(load_effort_record(out.path(), date("2024-10-30")).unwrap().is_none());

    let top = load_effort_record(out.path(), date("2024-10-16")).unwrap().unwrap();
    assert!((top.effort_rating - 3.30).abs() < 1e-9);

    assert!(telemetry::rated_total() >= 2);
    assert!(telemetry::gather_text().contains("effort_matches_rated_total"));
}

#[test]
fn test_write_failure_does_not_stop_later_matches() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    for (d, cal) in [("2024-10-09", "500"), ("2024-10-16", "900"), ("2024-10-30", "700")] {
        let dir = data.path().join(format!("match_{d}"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("calories.csv"), format!("calories\n{cal}\n")).unwrap();
    }
    // En mappe der output-fila for første kamp skulle ligget.
    fs::create_dir_all(record_path(out.path(), date("2024-10-09"))).unwrap();

    let args = Args::parse_from([
        "effort-rating",
        "--data",
        data.path().to_str().unwrap(),
        "--output",
        out.path().to_str().unwrap(),
        "--date",
        "2024-10-09",
        "--date",
        "2024-10-16",
        "--date",
        "2024-10-30",
    ]);
    let plan = resolve_plan(&args, PipelineConfig::default()).unwrap();
    let outcome = run(&plan);

    assert_eq!(outcome.report.ratings.len(), 3);
    assert_eq!(outcome.write_failures.len(), 1, "bare første kamp skal feile");
    assert_eq!(outcome.write_failures[0].match_date, date("2024-10-09"));
    assert_eq!(outcome.written.len(), 2);

    let later = load_effort_record(out.path(), date("2024-10-30")).unwrap().unwrap();
    assert!((later.effort_rating - 1.80).abs() < 1e-9);
    assert!(load_effort_record(out.path(), date("2024-10-16")).unwrap().is_some());
    assert!(telemetry::failed_total(FailureStage::Write) >= 1);
}

#[test]
fn test_run_writes_substitution_file_per_scheduled_match() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let dir = data.path().join("match_2024-10-09");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("calories.csv"), "calories\n500\n").unwrap();

    let schedule = data.path().join("schedule.csv");
    fs::write(
        &schedule,
        "date,opponent,start_time,end_time\n09/10/2024,Lyn,19:00:00,20:10:00\n16/10/2024,Skeid,19:00:00,20:10:00\n",
    )
    .unwrap();

    let args = Args::parse_from([
        "effort-rating",
        "--data",
        data.path().to_str().unwrap(),
        "--output",
        out.path().to_str().unwrap(),
        "--schedule",
        schedule.to_str().unwrap(),
    ]);
    let plan = resolve_plan(&args, PipelineConfig::default()).unwrap();
    let outcome = run(&plan);

    let subs = &outcome.substitutions;
    assert_eq!(subs.written.len(), 1);
    assert_eq!(subs.skipped, vec![date("2024-10-16")]);
    let (d, path, n) = &subs.written[0];
    assert_eq!(*d, date("2024-10-09"));
    assert_eq!(*n, 0);
    assert_eq!(*path, recommendations_path(out.path(), date("2024-10-09")));
    assert_eq!(fs::read_to_string(path).unwrap(), "");
}
