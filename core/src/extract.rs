use chrono::NaiveDate;
use ordered_float::OrderedFloat;

use crate::error::{EffortError, Result};
use crate::source::MatchDataSource;
use crate::types::{MatchEffortComponents, Metric, MetricSeries, Reduction};

/// Reduser en serie til én skalar. Tom serie → 0.0 for alle reduksjoner.
pub fn reduce(series: &MetricSeries, reduction: Reduction) -> f64 {
    let n = series.samples.len();
    if n == 0 {
        return 0.0;
    }
    match reduction {
        Reduction::Sum => series.values().sum(),
        Reduction::Mean => series.values().sum::<f64>() / n as f64,
        Reduction::Max => series
            .values()
            .map(OrderedFloat)
            .max()
            .map(|m| m.into_inner())
            .unwrap_or(0.0),
    }
}

/// Skalar for én metrikk. Manglende fil → 0.0.
pub fn extract_metric<S: MatchDataSource + ?Sized>(
    source: &S,
    date: NaiveDate,
    metric: Metric,
) -> Result<f64> {
    Ok(source
        .load_series(date, metric)?
        .map(|series| reduce(&series, metric.reduction()))
        .unwrap_or(0.0))
}

/// Metric Extractor: alle seks skalarer for én kamp.
///
/// Hele eksportdagen brukes – ingen filtrering til kampvinduet.
/// Første feil (korrupt fil) avbryter kun denne kampen.
pub fn extract_match<S: MatchDataSource + ?Sized>(
    source: &S,
    date: NaiveDate,
) -> Result<MatchEffortComponents> {
    if !source.has_match(date) {
        return Err(EffortError::MissingMatchData { date });
    }
    let mut components = MatchEffortComponents::default();
    for metric in Metric::ALL {
        components.set(metric, extract_metric(source, date, metric)?);
    }
    log::debug!("{date}: {components:?}");
    Ok(components)
}
