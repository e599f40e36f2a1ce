pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod schedule;
pub mod season;
pub mod source;
pub mod storage;
pub mod substitution;
pub mod telemetry;
pub mod types;

#[cfg(feature = "python")]
pub mod py;

pub use config::PipelineConfig;
pub use error::{EffortError, Result};
pub use extract::{extract_match, extract_metric, reduce};
pub use schedule::{load_schedule, ScheduledMatch};
pub use season::{
    compute_global_bounds, effort_rating, normalize, rate_match, score_season, GlobalBounds,
    SeasonReport, RATING_BOOST, RATING_SCALE,
};
pub use source::{DirectorySource, MatchDataSource, StaticSource};
pub use storage::{load_effort_record, read_effort_record, write_effort_record, EffortRecord};
pub use substitution::{analyze_match, run_substitutions, MatchWindow, Recommendation, SubstitutionReport};
pub use types::{MatchEffortComponents, MatchRating, Metric, MetricBounds, MetricSeries, Reduction};
