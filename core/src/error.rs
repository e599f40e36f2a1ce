use std::path::PathBuf;

use chrono::NaiveDate;

use crate::types::Metric;

/// Feil i effort-pipelinen.
///
/// Manglende metrikkfil og degenererte grenser er *ikke* feil: de gir
/// henholdsvis skalar 0 og normalisert 0.
#[derive(Debug, thiserror::Error)]
pub enum EffortError {
    #[error("no data directory for match {date}")]
    MissingMatchData { date: NaiveDate },

    #[error("malformed metric file {path}: {source}")]
    MalformedCsv { path: PathBuf, source: csv::Error },

    #[error("malformed metric file {path}: missing column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("malformed metric file {path}: row {row}: '{value}' is not a number")]
    BadValue {
        path: PathBuf,
        row: u64,
        value: String,
    },

    #[error("match {date}: {metric} timestamp '{value}' is not a date-time")]
    BadTimestamp {
        date: NaiveDate,
        metric: Metric,
        value: String,
    },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("schedule {path}: {reason}")]
    Schedule { path: PathBuf, reason: String },

    #[error("config error at {path}: {reason}")]
    Config { path: String, reason: String },
}

pub type Result<T> = std::result::Result<T, EffortError>;
