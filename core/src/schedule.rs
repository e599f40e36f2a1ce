use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{EffortError, Result};

/// Én rad i sesongplanen. `date` styrer iterasjonsrekkefølgen, start/slutt
/// gir kampvinduet til substitusjonsanalysen; resten er for presentasjon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledMatch {
    pub date: NaiveDate,
    pub opponent: Option<String>,
    pub home_or_away: Option<String>,
    pub user_goals_scored: Option<u32>,
    pub match_type: Option<String>,
    pub scoreline: Option<String>,
    pub result: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

impl ScheduledMatch {
    /// Kampstart som tidspunkt (uten tidssone), hvis planen har `start_time`.
    pub fn kickoff(&self) -> Option<NaiveDateTime> {
        self.start_time.map(|t| self.date.and_time(t))
    }

    pub fn final_whistle(&self) -> Option<NaiveDateTime> {
        self.end_time.map(|t| self.date.and_time(t))
    }

    pub fn is_home(&self) -> bool {
        self.home_or_away
            .as_deref()
            .map(|h| h.eq_ignore_ascii_case("home"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Deserialize)]
struct RawScheduleRow {
    date: String,
    #[serde(default)]
    opponent: Option<String>,
    #[serde(default)]
    home_or_away: Option<String>,
    #[serde(default)]
    user_goals_scored: Option<u32>,
    #[serde(default)]
    match_type: Option<String>,
    #[serde(default)]
    scoreline: Option<String>,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
}

/// Dag-først (planen skrives for hånd), så ISO.
const DATE_FORMATS: [&str; 4] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"];

pub fn parse_match_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// `HH:MM:SS` (eller `HH:MM`). Ugyldig → `None`, kampen mister bare vinduet.
pub fn parse_match_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

fn coerce_time(date: NaiveDate, column: &str, raw: Option<String>) -> Option<NaiveTime> {
    let raw = raw.filter(|s| !s.is_empty())?;
    let parsed = parse_match_time(&raw);
    if parsed.is_none() {
        log::warn!("⚠️ {date}: ugyldig {column} '{raw}' i sesongplanen, ignoreres");
    }
    parsed
}

pub fn load_schedule(path: &Path) -> Result<Vec<ScheduledMatch>> {
    let file = std::fs::File::open(path).map_err(|source| EffortError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let matches = parse_schedule(file, path)?;
    log::info!("📂 Sesongplan lastet fra {} ({} kamper)", path.display(), matches.len());
    Ok(matches)
}

/// Filrekkefølge beholdes; duplikatdatoer beholder første forekomst.
pub fn parse_schedule<R: Read>(rdr: R, path: &Path) -> Result<Vec<ScheduledMatch>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(rdr);

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for row in reader.deserialize::<RawScheduleRow>() {
        let row = row.map_err(|e| EffortError::Schedule {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let date = parse_match_date(&row.date).ok_or_else(|| EffortError::Schedule {
            path: path.to_path_buf(),
            reason: format!("unrecognised date '{}'", row.date),
        })?;
        if !seen.insert(date) {
            log::warn!("⚠️ Duplikat kampdato {date} i sesongplanen, beholder første");
            continue;
        }
        out.push(ScheduledMatch {
            date,
            opponent: row.opponent.filter(|s| !s.is_empty()),
            home_or_away: row.home_or_away.filter(|s| !s.is_empty()),
            user_goals_scored: row.user_goals_scored,
            match_type: row.match_type.filter(|s| !s.is_empty()),
            scoreline: row.scoreline.filter(|s| !s.is_empty()),
            result: row.result.filter(|s| !s.is_empty()),
            start_time: coerce_time(date, "start_time", row.start_time),
            end_time: coerce_time(date, "end_time", row.end_time),
        });
    }
    Ok(out)
}

pub fn match_dates(schedule: &[ScheduledMatch]) -> Vec<NaiveDate> {
    schedule.iter().map(|m| m.date).collect()
}
