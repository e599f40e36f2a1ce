// core/tests/test_telemetry.rs
//
// Egen testbinær: tellerne er prosessglobale, så eksakte tall krever at
// ingen andre tester kjører i samme prosess.
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use effortrating_core::telemetry::{self, FailureStage};
use effortrating_core::{score_season, DirectorySource};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn write_steps(root: &Path, d: &str, body: &str) {
    let dir = root.join(format!("match_{d}"));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("steps.csv"), body).unwrap();
}

#[test]
fn test_counters_follow_season_report() {
    let tmp = tempfile::tempdir().unwrap();
    write_steps(tmp.path(), "2024-10-09", "steps\n100\n");
    write_steps(tmp.path(), "2024-10-16", "steps\nmye\n");
    write_steps(tmp.path(), "2024-11-06", "steps\nlite\n");
    let source = DirectorySource::new(tmp.path());

    // Vanlig sesong: én ratet, én korrupt, én uten mappe.
    let report = score_season(
        &source,
        &[date("2024-10-09"), date("2024-10-16"), date("2024-10-30")],
    );
    assert_eq!(report.ratings.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(telemetry::rated_total(), 1);
    assert_eq!(
        telemetry::failed_total(FailureStage::Extract),
        1,
        "korrupt kamp skal telles én gang, ikke i begge faser"
    );
    assert_eq!(telemetry::skipped_total(), 1);

    // Ingen kamp bidrar til grensene: utfallene telles likevel.
    let degenerate = score_season(&source, &[date("2024-11-06"), date("2024-11-13")]);
    assert!(!degenerate.bounds.is_defined());
    assert!(degenerate.ratings.is_empty());
    assert_eq!(degenerate.failed.len(), 1);
    assert_eq!(degenerate.failed[0].match_date, date("2024-11-06"));
    assert_eq!(degenerate.skipped, vec![date("2024-11-13")]);

    let failed = (report.failed.len() + degenerate.failed.len()) as u64;
    let skipped = (report.skipped.len() + degenerate.skipped.len()) as u64;
    assert_eq!(telemetry::rated_total(), 1);
    assert_eq!(telemetry::failed_total(FailureStage::Extract), failed);
    assert_eq!(telemetry::skipped_total(), skipped);
    assert_eq!(telemetry::failed_total(FailureStage::Write), 0);

    let text = telemetry::gather_text();
    assert!(text.contains(r#"effort_matches_failed_total{stage="extract"} 2"#), "{text}");
}
