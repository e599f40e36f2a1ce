// core/src/source.rs
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::{EffortError, Result};
use crate::types::{Metric, MetricSample, MetricSeries};

/// Tilgang til én kamps rådata. Prod: `DirectorySource`, test: `StaticSource`.
pub trait MatchDataSource {
    /// Finnes det i det hele tatt data for kampen?
    fn has_match(&self, date: NaiveDate) -> bool;

    /// `Ok(None)` betyr at fila mangler (→ skalar 0), ikke at den er tom.
    fn load_series(&self, date: NaiveDate, metric: Metric) -> Result<Option<MetricSeries>>;
}

/// Mappestruktur fra preprocess-steget: `<root>/match_<YYYY-MM-DD>/<fil>.csv`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn match_dir(&self, date: NaiveDate) -> PathBuf {
        self.root.join(format!("match_{}", date.format("%Y-%m-%d")))
    }

    pub fn metric_path(&self, date: NaiveDate, metric: Metric) -> PathBuf {
        self.match_dir(date).join(metric.file_name())
    }
}

impl MatchDataSource for DirectorySource {
    fn has_match(&self, date: NaiveDate) -> bool {
        self.match_dir(date).is_dir()
    }

    fn load_series(&self, date: NaiveDate, metric: Metric) -> Result<Option<MetricSeries>> {
        let path = self.metric_path(date, metric);
        if !path.exists() {
            log::debug!("{} mangler for {}, bruker 0", metric.file_name(), date);
            return Ok(None);
        }
        let file = File::open(&path).map_err(|source| EffortError::Io {
            path: path.clone(),
            source,
        })?;
        parse_series(file, metric, &path).map(Some)
    }
}

/// In-memory kilde. Kamper uten registrerte serier finnes fortsatt (tom mappe).
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    matches: HashSet<NaiveDate>,
    series: HashMap<(NaiveDate, Metric), MetricSeries>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_match(&mut self, date: NaiveDate) -> &mut Self {
        self.matches.insert(date);
        self
    }

    pub fn add_series(&mut self, date: NaiveDate, series: MetricSeries) -> &mut Self {
        self.matches.insert(date);
        self.series.insert((date, series.metric), series);
        self
    }

    pub fn add_values(&mut self, date: NaiveDate, metric: Metric, values: &[f64]) -> &mut Self {
        self.add_series(date, MetricSeries::from_values(metric, values))
    }
}

impl MatchDataSource for StaticSource {
    fn has_match(&self, date: NaiveDate) -> bool {
        self.matches.contains(&date)
    }

    fn load_series(&self, date: NaiveDate, metric: Metric) -> Result<Option<MetricSeries>> {
        Ok(self.series.get(&(date, metric)).cloned())
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// CSV-parsing
// ──────────────────────────────────────────────────────────────────────────────

/// Leser én eksportfil. Header-rad kreves; kolonnen slås opp på eksakt navn.
/// Tomme celler og NaN hoppes over (som pandas sine reduksjoner).
pub fn parse_series<R: Read>(rdr: R, metric: Metric, path: &Path) -> Result<MetricSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(rdr);

    let malformed = |source: csv::Error| EffortError::MalformedCsv {
        path: path.to_path_buf(),
        source,
    };

    let headers = reader.headers().map_err(malformed)?.clone();
    let value_idx = headers
        .iter()
        .position(|h| h == metric.column())
        .ok_or_else(|| EffortError::MissingColumn {
            path: path.to_path_buf(),
            column: metric.column().to_string(),
        })?;
    let time_idx = headers.iter().enumerate().position(|(i, h)| {
        let h = h.to_ascii_lowercase();
        i != value_idx && (h.contains("time") || h.contains("date"))
    });

    let mut samples = Vec::new();
    for record in reader.records() {
        let record = record.map_err(malformed)?;
        let raw = record.get(value_idx).unwrap_or("");
        if raw.is_empty() {
            continue;
        }
        let value: f64 = raw.parse().map_err(|_| EffortError::BadValue {
            path: path.to_path_buf(),
            row: record.position().map(|p| p.line()).unwrap_or(0),
            value: raw.to_string(),
        })?;
        if value.is_nan() {
            continue;
        }
        let timestamp = time_idx
            .and_then(|i| record.get(i))
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        samples.push(MetricSample { timestamp, value });
    }

    Ok(MetricSeries::new(metric, samples))
}
