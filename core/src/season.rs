use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{EffortError, Result};
use crate::extract::extract_match;
use crate::source::MatchDataSource;
use crate::telemetry::{self, FailureStage};
use crate::types::{MatchEffortComponents, MatchRating, Metric, MetricBounds};

/// Skalering til "ut av 10".
pub const RATING_SCALE: f64 = 10.0;
/// Fast boost, uten klamping (rating kan havne litt utenfor 0–10).
pub const RATING_BOOST: f64 = 0.30;

// ──────────────────────────────────────────────────────────────────────────────
// Fase 1: globale grenser som eksplisitt fold
// ──────────────────────────────────────────────────────────────────────────────

/// Sesongens min/max per metrikk. Immutabel verdi – `observe` gir en ny.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalBounds {
    bounds: [MetricBounds; 6],
    matches: usize,
}

impl GlobalBounds {
    /// {+inf, -inf} for alle metrikker – udefinert til første `observe`.
    pub fn empty() -> Self {
        Self {
            bounds: [MetricBounds::EMPTY; 6],
            matches: 0,
        }
    }

    pub fn observe(self, components: &MatchEffortComponents) -> Self {
        let mut bounds = self.bounds;
        for metric in Metric::ALL {
            bounds[metric as usize] = bounds[metric as usize].widen(components.get(metric));
        }
        Self {
            bounds,
            matches: self.matches + 1,
        }
    }

    pub fn from_components<'a, I>(components: I) -> Self
    where
        I: IntoIterator<Item = &'a MatchEffortComponents>,
    {
        components
            .into_iter()
            .fold(Self::empty(), |acc, c| acc.observe(c))
    }

    pub fn get(&self, metric: Metric) -> MetricBounds {
        self.bounds[metric as usize]
    }

    pub fn matches_observed(&self) -> usize {
        self.matches
    }

    /// Falsk når ingen kamp bidro; da skal grensene ikke brukes.
    pub fn is_defined(&self) -> bool {
        self.matches > 0
    }
}

impl Default for GlobalBounds {
    fn default() -> Self {
        Self::empty()
    }
}

/// Utfall av fase 1 for én kamp.
enum BoundsOutcome {
    Observed,
    Missing,
    Failed(String),
}

fn fold_bounds<S: MatchDataSource + ?Sized>(
    source: &S,
    dates: &[NaiveDate],
) -> (GlobalBounds, Vec<(NaiveDate, BoundsOutcome)>) {
    let mut outcomes = Vec::with_capacity(dates.len());
    let bounds = dates.iter().fold(GlobalBounds::empty(), |acc, &date| {
        match extract_match(source, date) {
            Ok(components) => {
                outcomes.push((date, BoundsOutcome::Observed));
                acc.observe(&components)
            }
            Err(EffortError::MissingMatchData { .. }) => {
                outcomes.push((date, BoundsOutcome::Missing));
                acc
            }
            Err(e) => {
                log::debug!("{date}: utelatt fra globale grenser: {e}");
                outcomes.push((date, BoundsOutcome::Failed(e.to_string())));
                acc
            }
        }
    });
    log::info!(
        "📊 Globale grenser fra {} av {} kamper",
        bounds.matches_observed(),
        dates.len()
    );
    (bounds, outcomes)
}

/// Fase 1 over sesonglista. Manglende mapper hoppes over stille, korrupte
/// kamper holdes utenfor grensene.
pub fn compute_global_bounds<S: MatchDataSource + ?Sized>(
    source: &S,
    dates: &[NaiveDate],
) -> GlobalBounds {
    fold_bounds(source, dates).0
}

// ──────────────────────────────────────────────────────────────────────────────
// Fase 2: normalisering og vekting
// ──────────────────────────────────────────────────────────────────────────────

/// Min-max mot sesonggrensene. Null varians (eller udefinert) → 0.
pub fn normalize(value: f64, bounds: MetricBounds) -> f64 {
    if bounds.max > bounds.min {
        (value - bounds.min) / (bounds.max - bounds.min)
    } else {
        0.0
    }
}

pub fn normalize_components(
    components: &MatchEffortComponents,
    bounds: &GlobalBounds,
) -> MatchEffortComponents {
    let mut out = MatchEffortComponents::default();
    for metric in Metric::ALL {
        out.set(metric, normalize(components.get(metric), bounds.get(metric)));
    }
    out
}

/// Vektet sum av normaliserte komponenter (0–1 når alle ligger innenfor grensene).
pub fn combine(normalized: &MatchEffortComponents) -> f64 {
    Metric::ALL
        .iter()
        .map(|m| normalized.get(*m) * m.weight())
        .sum()
}

/// Runder den eksakte binærverdien til 2 desimaler; ekte halvering går til
/// partall (som Pythons `round(x, 2)`). Ikke via `x * 100`: 0.42499.. må bli 0.42.
pub fn round2(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    format!("{x:.2}").parse().unwrap_or(x)
}

/// Rating = round(combine × 10 + 0.30, 2).
pub fn effort_rating(components: &MatchEffortComponents, bounds: &GlobalBounds) -> f64 {
    rating_from_normalized(&normalize_components(components, bounds))
}

fn rating_from_normalized(normalized: &MatchEffortComponents) -> f64 {
    round2(combine(normalized) * RATING_SCALE + RATING_BOOST)
}

/// Ren scoring av ferdig ekstraherte komponenter.
pub fn score_components(
    match_date: NaiveDate,
    components: MatchEffortComponents,
    bounds: &GlobalBounds,
) -> MatchRating {
    let normalized = normalize_components(&components, bounds);
    let effort_rating = rating_from_normalized(&normalized);
    MatchRating {
        match_date,
        components,
        normalized,
        effort_rating,
    }
}

/// Fase 2 for én kamp. Ekstraherer på nytt (ingen cache mellom fasene).
pub fn rate_match<S: MatchDataSource + ?Sized>(
    source: &S,
    date: NaiveDate,
    bounds: &GlobalBounds,
) -> Result<MatchRating> {
    let components = extract_match(source, date)?;
    Ok(score_components(date, components, bounds))
}

// ──────────────────────────────────────────────────────────────────────────────
// Sesong-driver
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MatchFailure {
    pub match_date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct SeasonReport {
    pub bounds: GlobalBounds,
    pub ratings: Vec<MatchRating>,
    pub skipped: Vec<NaiveDate>,
    pub failed: Vec<MatchFailure>,
}

impl SeasonReport {
    fn new(bounds: GlobalBounds) -> Self {
        Self {
            bounds,
            ratings: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    // Tellerne oppdateres bare her, så de alltid stemmer med listene.

    fn rate(&mut self, rating: MatchRating) {
        log::info!("✅ {}: effort rating {:.2}", rating.match_date, rating.effort_rating);
        telemetry::record_rated();
        self.ratings.push(rating);
    }

    fn skip(&mut self, date: NaiveDate) {
        log::info!("Ingen datamappe for kamp {date}, hopper over");
        telemetry::record_skipped();
        self.skipped.push(date);
    }

    fn fail(&mut self, date: NaiveDate, reason: String) {
        log::warn!("⚠️ {date}: avbrutt: {reason}");
        telemetry::record_failed(FailureStage::Extract);
        self.failed.push(MatchFailure {
            match_date: date,
            reason,
        });
    }
}

/// Begge fasene i rekkefølge. Feil er lokale for én kamp; sesongen fortsetter.
pub fn score_season<S: MatchDataSource + ?Sized>(source: &S, dates: &[NaiveDate]) -> SeasonReport {
    let (bounds, phase1) = fold_bounds(source, dates);
    let mut report = SeasonReport::new(bounds);

    if !bounds.is_defined() {
        // Ingen kamp bidro: utfallet fra fase 1 er fasit, ingen ny ekstrahering.
        log::info!("Ingen kamper bidro til grensene – ingen rating beregnes");
        for (date, outcome) in phase1 {
            match outcome {
                BoundsOutcome::Missing => report.skip(date),
                BoundsOutcome::Failed(reason) => report.fail(date, reason),
                BoundsOutcome::Observed => report.fail(date, "global bounds undefined".into()),
            }
        }
        return report;
    }

    for &date in dates {
        match rate_match(source, date, &bounds) {
            Ok(rating) => report.rate(rating),
            Err(EffortError::MissingMatchData { .. }) => report.skip(date),
            Err(e) => report.fail(date, e.to_string()),
        }
    }
    report
}
