use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EffortError, Result};
use crate::types::{MatchEffortComponents, MatchRating};

pub const EFFORT_DIR: &str = "effort_ratings";

/// Én rad i output-fila – eneste kontrakt mot dashboardet.
/// Kolonnerekkefølgen er fast: de seks råskalarene, så `effort_rating`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffortRecord {
    pub active_zone_minutes: f64,
    pub calories: f64,
    pub distance: f64,
    pub steps: f64,
    pub avg_heart_rate: f64,
    pub peak_exercise_heart_rate: f64,
    pub effort_rating: f64,
}

impl EffortRecord {
    pub fn components(&self) -> MatchEffortComponents {
        MatchEffortComponents {
            active_zone_minutes: self.active_zone_minutes,
            calories: self.calories,
            distance: self.distance,
            steps: self.steps,
            avg_heart_rate: self.avg_heart_rate,
            peak_exercise_heart_rate: self.peak_exercise_heart_rate,
        }
    }
}

impl From<&MatchRating> for EffortRecord {
    fn from(r: &MatchRating) -> Self {
        let c = &r.components;
        Self {
            active_zone_minutes: c.active_zone_minutes,
            calories: c.calories,
            distance: c.distance,
            steps: c.steps,
            avg_heart_rate: c.avg_heart_rate,
            peak_exercise_heart_rate: c.peak_exercise_heart_rate,
            effort_rating: r.effort_rating,
        }
    }
}

/// `<output>/effort_ratings/effort_rating_<YYYY-MM-DD>.csv`
pub fn record_path(output_root: &Path, date: NaiveDate) -> PathBuf {
    output_root
        .join(EFFORT_DIR)
        .join(format!("effort_rating_{}.csv", date.format("%Y-%m-%d")))
}

/// Skriver ratingen til disk (header + én rad). Mappa opprettes ved behov.
pub fn write_effort_record(output_root: &Path, rating: &MatchRating) -> Result<PathBuf> {
    let path = record_path(output_root, rating.match_date);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| EffortError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let csv_err = |source: csv::Error| EffortError::MalformedCsv {
        path: path.clone(),
        source,
    };
    let mut writer = csv::Writer::from_path(&path).map_err(csv_err)?;
    writer.serialize(EffortRecord::from(rating)).map_err(csv_err)?;
    writer.flush().map_err(|source| EffortError::Io {
        path: path.clone(),
        source,
    })?;

    log::info!(
        "✅ Effort rating for {} lagret til {} ({:.2})",
        rating.match_date,
        path.display(),
        rating.effort_rating
    );
    Ok(path)
}

/// Leser en output-rad tilbake (for konsumenter; ratingen regnes aldri på nytt).
pub fn read_effort_record(path: &Path) -> Result<EffortRecord> {
    let csv_err = |source: csv::Error| EffortError::MalformedCsv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    match reader.deserialize::<EffortRecord>().next() {
        Some(record) => record.map_err(csv_err),
        None => Err(EffortError::MissingColumn {
            path: path.to_path_buf(),
            column: "effort_rating".into(),
        }),
    }
}

/// Hent lagret rating for en kampdato, `None` hvis kampen ikke ble ratet.
pub fn load_effort_record(output_root: &Path, date: NaiveDate) -> Result<Option<EffortRecord>> {
    let path = record_path(output_root, date);
    if !path.exists() {
        log::debug!("Ingen effort rating på {}", path.display());
        return Ok(None);
    }
    read_effort_record(&path).map(Some)
}
