// core/src/substitution.rs
//
// Bytteanbefalinger innenfor kampvinduet: vedvarende høy puls og fall i
// bevegelsesrate. I motsetning til effort-ratingen filtreres her på tid.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{EffortError, Result};
use crate::schedule::ScheduledMatch;
use crate::season::MatchFailure;
use crate::source::MatchDataSource;
use crate::telemetry::{self, FailureStage};
use crate::types::{Metric, MetricSeries};

pub const SUBSTITUTION_DIR: &str = "substitution_recommendations";

pub const TOLERANCE_BEFORE_MIN: i64 = 5;
pub const TOLERANCE_AFTER_MIN: i64 = 10;
/// Minste tid på banen mellom to anbefalinger.
pub const MIN_TIME_ON_PITCH_MIN: i64 = 5;

/// Andel av HRmax (220 − alder) som regnes som høy innsats.
pub const HIGH_EFFORT_FRACTION: f64 = 0.8;
/// Antall påfølgende høy-puls-samples (≈ sekunder) før tretthet meldes.
pub const FATIGUE_WINDOW: usize = 240;

pub const DROP_STATIC_THRESHOLD: f64 = -0.3;
pub const DROP_QUANTILE: f64 = 0.4;
pub const DROP_WINDOW: usize = 5;
pub const DROP_MIN_COUNT: usize = 2;

pub const DEFAULT_ATHLETE_AGE: u32 = 22;

/// Kampvindu med toleranse: start − 5 min til slutt + 10 min (inklusivt).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl MatchWindow {
    pub fn new(kickoff: NaiveDateTime, final_whistle: NaiveDateTime) -> Self {
        Self {
            start: kickoff - Duration::minutes(TOLERANCE_BEFORE_MIN),
            end: final_whistle + Duration::minutes(TOLERANCE_AFTER_MIN),
        }
    }

    pub fn from_schedule(m: &ScheduledMatch) -> Option<Self> {
        Some(Self::new(m.kickoff()?, m.final_whistle()?))
    }

    pub fn contains(&self, t: NaiveDateTime) -> bool {
        t >= self.start && t <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionReason {
    SustainedHighHeartRate,
    MovementDrop,
}

impl fmt::Display for SubstitutionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SubstitutionReason::SustainedHighHeartRate => {
                "Sustained high heart rate detected. Consider substitution."
            }
            SubstitutionReason::MovementDrop => {
                "Sustained significant drop in movement rate detected. Consider substitution."
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub at: NaiveDateTime,
    pub reason: SubstitutionReason,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.at, self.reason)
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Tidsstempler og vindu
// ──────────────────────────────────────────────────────────────────────────────

const SAMPLE_TIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Tidssone kastes (veggklokke beholdes), som `tz_localize(None)`.
pub fn parse_sample_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.naive_local());
    }
    SAMPLE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Samples innenfor vinduet, i filrekkefølge. Rader uten tidsstempel faller ut.
pub fn samples_in_window(
    series: &MetricSeries,
    date: NaiveDate,
    window: &MatchWindow,
) -> Result<Vec<(NaiveDateTime, f64)>> {
    let mut out = Vec::new();
    for sample in &series.samples {
        let Some(raw) = sample.timestamp.as_deref() else {
            continue;
        };
        let t = parse_sample_time(raw).ok_or_else(|| EffortError::BadTimestamp {
            date,
            metric: series.metric,
            value: raw.to_string(),
        })?;
        if window.contains(t) {
            out.push((t, sample.value));
        }
    }
    Ok(out)
}

// ──────────────────────────────────────────────────────────────────────────────
// Deteksjon
// ──────────────────────────────────────────────────────────────────────────────

/// Antall sanne flagg i de siste `window` radene (inkludert denne).
pub fn rolling_count(flags: &[bool], window: usize) -> Vec<usize> {
    let mut out = Vec::with_capacity(flags.len());
    let mut count = 0usize;
    for i in 0..flags.len() {
        if flags[i] {
            count += 1;
        }
        if i >= window && flags[i - window] {
            count -= 1;
        }
        out.push(count);
    }
    out
}

pub fn high_effort_threshold(age: u32) -> f64 {
    HIGH_EFFORT_FRACTION * (220.0 - age as f64)
}

/// Tidspunkt der de siste 240 pulssamplene alle lå over terskelen.
pub fn fatigue_times(heart_rate: &[(NaiveDateTime, f64)], age: u32) -> Vec<NaiveDateTime> {
    let threshold = high_effort_threshold(age);
    let flags: Vec<bool> = heart_rate.iter().map(|(_, bpm)| *bpm > threshold).collect();
    rolling_count(&flags, FATIGUE_WINDOW)
        .into_iter()
        .zip(heart_rate)
        .filter(|(n, _)| *n >= FATIGUE_WINDOW)
        .map(|(_, (t, _))| *t)
        .collect()
}

/// Meter per sekund mellom påfølgende rader. Første rad er 0/0 = NaN;
/// lik tid gir ±inf eller NaN.
pub fn rates_of_change(distance: &[(NaiveDateTime, f64)]) -> Vec<f64> {
    let mut out = Vec::with_capacity(distance.len());
    for i in 0..distance.len() {
        let (dt, dd) = if i == 0 {
            (0.0, 0.0)
        } else {
            let secs = (distance[i].0 - distance[i - 1].0).num_milliseconds() as f64 / 1000.0;
            (secs, distance[i].1 - distance[i - 1].1)
        };
        out.push(dd / dt);
    }
    out
}

/// Lineær interpolasjon mellom nærmeste rangerte verdier; NaN ignoreres.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut xs: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if xs.is_empty() {
        return None;
    }
    xs.sort_by(|a, b| a.total_cmp(b));
    let pos = q * (xs.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    if frac == 0.0 {
        return Some(xs[lo]);
    }
    Some(xs[lo] + (xs[hi] - xs[lo]) * frac)
}

/// min(−0.3, 40-persentil). En udefinert persentil gir den statiske terskelen.
pub fn drop_threshold(rates: &[f64]) -> f64 {
    match quantile(rates, DROP_QUANTILE) {
        Some(dynamic) if dynamic < DROP_STATIC_THRESHOLD => dynamic,
        _ => DROP_STATIC_THRESHOLD,
    }
}

/// Tidspunkt med minst 2 fall under terskelen blant de siste 5 radene.
pub fn movement_drop_times(distance: &[(NaiveDateTime, f64)]) -> Vec<NaiveDateTime> {
    let rates = rates_of_change(distance);
    let threshold = drop_threshold(&rates);
    let flags: Vec<bool> = rates.iter().map(|r| *r < threshold).collect();
    rolling_count(&flags, DROP_WINDOW)
        .into_iter()
        .zip(distance)
        .filter(|(n, _)| *n >= DROP_MIN_COUNT)
        .map(|(_, (t, _))| *t)
        .collect()
}

/// Puls først, så distanse. Begge deler samme "sist byttet"-klokke, som
/// starter ved vinduets start.
pub fn recommend(
    window: &MatchWindow,
    heart_rate: &[(NaiveDateTime, f64)],
    distance: &[(NaiveDateTime, f64)],
    age: u32,
) -> Vec<Recommendation> {
    let min_on_pitch = Duration::minutes(MIN_TIME_ON_PITCH_MIN);
    let mut last = window.start;
    let mut out = Vec::new();

    let candidates = fatigue_times(heart_rate, age)
        .into_iter()
        .map(|t| (t, SubstitutionReason::SustainedHighHeartRate))
        .chain(
            movement_drop_times(distance)
                .into_iter()
                .map(|t| (t, SubstitutionReason::MovementDrop)),
        );
    for (at, reason) in candidates {
        if at - last >= min_on_pitch {
            out.push(Recommendation { at, reason });
            last = at;
        }
    }
    out
}

// ──────────────────────────────────────────────────────────────────────────────
// Per kamp og per sesong
// ──────────────────────────────────────────────────────────────────────────────

/// Anbefalinger for én kamp. Mangler planen start/slutt, blir lista tom.
pub fn analyze_match<S: MatchDataSource + ?Sized>(
    source: &S,
    scheduled: &ScheduledMatch,
    age: u32,
) -> Result<Vec<Recommendation>> {
    let date = scheduled.date;
    if !source.has_match(date) {
        return Err(EffortError::MissingMatchData { date });
    }
    let Some(window) = MatchWindow::from_schedule(scheduled) else {
        log::warn!("⚠️ {date}: start_time/end_time mangler i planen, ingen bytteanalyse");
        return Ok(Vec::new());
    };

    let load = |metric: Metric| -> Result<Vec<(NaiveDateTime, f64)>> {
        match source.load_series(date, metric)? {
            Some(series) => samples_in_window(&series, date, &window),
            None => Ok(Vec::new()),
        }
    };
    let heart_rate = load(Metric::AvgHeartRate)?;
    let distance = load(Metric::Distance)?;

    let recs = recommend(&window, &heart_rate, &distance, age);
    log::debug!("{date}: {} bytteanbefalinger", recs.len());
    Ok(recs)
}

/// `<output>/substitution_recommendations/substitution_recommendations_<date>.txt`
pub fn recommendations_path(output_root: &Path, date: NaiveDate) -> PathBuf {
    output_root.join(SUBSTITUTION_DIR).join(format!(
        "substitution_recommendations_{}.txt",
        date.format("%Y-%m-%d")
    ))
}

/// Én linje per anbefaling, uten avsluttende linjeskift. Tom liste gir tom fil.
pub fn write_recommendations(
    output_root: &Path,
    date: NaiveDate,
    recs: &[Recommendation],
) -> Result<PathBuf> {
    let path = recommendations_path(output_root, date);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| EffortError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let body = recs
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(&path, body).map_err(|source| EffortError::Io {
        path: path.clone(),
        source,
    })?;
    log::info!("✅ Bytteanbefalinger for {date} lagret til {}", path.display());
    Ok(path)
}

#[derive(Debug, Clone, Default)]
pub struct SubstitutionReport {
    pub written: Vec<(NaiveDate, PathBuf, usize)>,
    pub skipped: Vec<NaiveDate>,
    pub failed: Vec<MatchFailure>,
}

/// Går gjennom planen; hver kamp er uavhengig, feil stopper ikke resten.
pub fn run_substitutions<S: MatchDataSource + ?Sized>(
    source: &S,
    schedule: &[ScheduledMatch],
    age: u32,
    output_root: &Path,
) -> SubstitutionReport {
    let mut report = SubstitutionReport::default();
    for scheduled in schedule {
        let date = scheduled.date;
        let outcome = analyze_match(source, scheduled, age)
            .and_then(|recs| write_recommendations(output_root, date, &recs).map(|p| (p, recs.len())));
        match outcome {
            Ok((path, n)) => report.written.push((date, path, n)),
            Err(EffortError::MissingMatchData { .. }) => {
                log::info!("Ingen datamappe for kamp {date}, hopper over bytteanalyse");
                report.skipped.push(date);
            }
            Err(e) => {
                log::warn!("⚠️ {date}: bytteanalyse feilet: {e}");
                telemetry::record_failed(FailureStage::Substitution);
                report.failed.push(MatchFailure {
                    match_date: date,
                    reason: e.to_string(),
                });
            }
        }
    }
    report
}
