// Python-binding (maturin --features python). Dashboardet leser bare output-filene;
// denne brukes fra notebooks/skript som vil kjøre pipelinen direkte.

use std::path::Path;

use chrono::NaiveDate;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;
use serde_json::json;

use crate::season::score_season;
use crate::source::DirectorySource;
use crate::storage::read_effort_record;

fn parse_dates(match_dates: &[String]) -> PyResult<Vec<NaiveDate>> {
    match_dates
        .iter()
        .map(|d| {
            NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
                .map_err(|e| PyValueError::new_err(format!("ugyldig kampdato '{d}': {e}")))
        })
        .collect()
}

/// Kjør begge fasene og returner JSON: {"ratings": [...], "skipped": [...], "failed": [...]}.
#[pyfunction]
fn season_effort_ratings_json(data_folder: &str, match_dates: Vec<String>) -> PyResult<String> {
    let dates = parse_dates(&match_dates)?;
    let report = score_season(&DirectorySource::new(data_folder), &dates);
    let out = json!({
        "ratings": report.ratings,
        "skipped": report.skipped,
        "failed": report.failed,
    });
    serde_json::to_string(&out).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Les en lagret output-rad som JSON.
#[pyfunction]
fn read_effort_record_json(path: &str) -> PyResult<String> {
    let record = read_effort_record(Path::new(path))
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    serde_json::to_string(&record).map_err(|e| PyValueError::new_err(e.to_string()))
}

#[pymodule]
fn effortrating_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(season_effort_ratings_json, m)?)?;
    m.add_function(wrap_pyfunction!(read_effort_record_json, m)?)?;
    Ok(())
}
