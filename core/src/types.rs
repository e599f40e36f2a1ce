use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Hvordan en tidsserie reduseres til én skalar per kamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    Sum,
    Mean,
    Max,
}

/// De seks signalene som inngår i effort-ratingen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    ActiveZoneMinutes,
    Calories,
    Distance,
    Steps,
    AvgHeartRate,
    PeakExerciseHeartRate,
}

impl Metric {
    /// Kanonisk rekkefølge – samme som kolonnene i output-raden.
    pub const ALL: [Metric; 6] = [
        Metric::ActiveZoneMinutes,
        Metric::Calories,
        Metric::Distance,
        Metric::Steps,
        Metric::AvgHeartRate,
        Metric::PeakExerciseHeartRate,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Metric::ActiveZoneMinutes => "active_zone_minutes",
            Metric::Calories => "calories",
            Metric::Distance => "distance",
            Metric::Steps => "steps",
            Metric::AvgHeartRate => "avg_heart_rate",
            Metric::PeakExerciseHeartRate => "peak_exercise_heart_rate",
        }
    }

    /// Filnavn i kampmappen (etter rename i preprocess-steget).
    pub fn file_name(self) -> &'static str {
        match self {
            Metric::ActiveZoneMinutes => "active_zone_minutes_day.csv",
            Metric::Calories => "calories.csv",
            Metric::Distance => "distance.csv",
            Metric::Steps => "steps.csv",
            Metric::AvgHeartRate => "heart_rate.csv",
            Metric::PeakExerciseHeartRate => "UserExercises.csv",
        }
    }

    /// Kolonnen som holder verdien i eksportfila.
    pub fn column(self) -> &'static str {
        match self {
            Metric::ActiveZoneMinutes => "total minutes",
            Metric::Calories => "calories",
            Metric::Distance => "distance",
            Metric::Steps => "steps",
            Metric::AvgHeartRate => "beats per minute",
            Metric::PeakExerciseHeartRate => "tracker_peak_heart_rate",
        }
    }

    pub fn reduction(self) -> Reduction {
        match self {
            Metric::AvgHeartRate => Reduction::Mean,
            Metric::PeakExerciseHeartRate => Reduction::Max,
            _ => Reduction::Sum,
        }
    }

    /// Faste vekter (sum = 1.0). Ikke konfigurerbare.
    pub fn weight(self) -> f64 {
        match self {
            Metric::ActiveZoneMinutes => 0.35,
            Metric::Calories => 0.30,
            Metric::Distance => 0.25,
            Metric::Steps => 0.05,
            Metric::AvgHeartRate => 0.025,
            Metric::PeakExerciseHeartRate => 0.025,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub timestamp: Option<String>,
    pub value: f64,
}

/// Én kamps tidsserie for ett signal, i filrekkefølge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub metric: Metric,
    pub samples: Vec<MetricSample>,
}

impl MetricSeries {
    pub fn new(metric: Metric, samples: Vec<MetricSample>) -> Self {
        Self { metric, samples }
    }

    /// Hjelper for tester/innebygging: verdier uten tidsstempel.
    pub fn from_values(metric: Metric, values: &[f64]) -> Self {
        let samples = values
            .iter()
            .map(|v| MetricSample { timestamp: None, value: *v })
            .collect();
        Self { metric, samples }
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.value)
    }
}

/// Skalarene for én kamp. Manglende kildedata = 0.0, ikke fravær.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchEffortComponents {
    pub active_zone_minutes: f64,
    pub calories: f64,
    pub distance: f64,
    pub steps: f64,
    pub avg_heart_rate: f64,
    pub peak_exercise_heart_rate: f64,
}

impl MatchEffortComponents {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::ActiveZoneMinutes => self.active_zone_minutes,
            Metric::Calories => self.calories,
            Metric::Distance => self.distance,
            Metric::Steps => self.steps,
            Metric::AvgHeartRate => self.avg_heart_rate,
            Metric::PeakExerciseHeartRate => self.peak_exercise_heart_rate,
        }
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        let slot = match metric {
            Metric::ActiveZoneMinutes => &mut self.active_zone_minutes,
            Metric::Calories => &mut self.calories,
            Metric::Distance => &mut self.distance,
            Metric::Steps => &mut self.steps,
            Metric::AvgHeartRate => &mut self.avg_heart_rate,
            Metric::PeakExerciseHeartRate => &mut self.peak_exercise_heart_rate,
        };
        *slot = value;
    }

    /// Builder-variant av `set`, praktisk i tester.
    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        self.set(metric, value);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricBounds {
    pub min: f64,
    pub max: f64,
}

impl MetricBounds {
    /// Startverdi for folden: {+inf, -inf}, dvs. udefinert.
    pub const EMPTY: MetricBounds = MetricBounds {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    pub fn widen(self, value: f64) -> Self {
        Self {
            min: self.min.min(value),
            max: self.max.max(value),
        }
    }

    /// Har minst én kamp bidratt?
    pub fn is_defined(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.max >= self.min
    }
}

/// Resultatet for én kamp: rating + komponentene den er regnet fra.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRating {
    pub match_date: NaiveDate,
    pub components: MatchEffortComponents,
    pub normalized: MatchEffortComponents,
    pub effort_rating: f64,
}
