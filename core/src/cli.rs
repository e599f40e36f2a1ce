use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::schedule::{load_schedule, match_dates, ScheduledMatch};
use crate::season::{score_season, MatchFailure, SeasonReport};
use crate::source::DirectorySource;
use crate::storage::write_effort_record;
use crate::substitution::{run_substitutions, SubstitutionReport};
use crate::telemetry::{self, FailureStage};
use crate::types::Metric;

#[derive(Debug, Parser)]
#[command(name = "effort-rating", about = "Season-normalized effort rating per match")]
pub struct Args {
    /// JSON-konfig (mangler den brukes default)
    #[arg(long, default_value = "effort_rating.json")]
    pub config: PathBuf,

    /// Overstyr data_folder
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Overstyr output_folder
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Sesongplan (CSV med `date`-kolonne)
    #[arg(long)]
    pub schedule: Option<PathBuf>,

    /// Kampdato(er), YYYY-MM-DD. Vinner over plan og konfig.
    #[arg(long = "date")]
    pub dates: Vec<NaiveDate>,

    /// Skriv Prometheus-tellere til stdout etterpå
    #[arg(long)]
    pub metrics: bool,
}

/// Ferdig oppløst kjøring: konfig + datoer (+ plan hvis brukt).
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub config: PipelineConfig,
    pub dates: Vec<NaiveDate>,
    pub schedule: Vec<ScheduledMatch>,
}

/// Rekkefølge: eksplisitte datoer > sesongplan > konfig-liste.
pub fn resolve_plan(args: &Args, mut config: PipelineConfig) -> Result<RunPlan> {
    if let Some(d) = &args.data {
        config.data_folder = d.clone();
    }
    if let Some(o) = &args.output {
        config.output_folder = o.clone();
    }
    if let Some(s) = &args.schedule {
        config.schedule_path = Some(s.clone());
    }

    let schedule = match &config.schedule_path {
        Some(path) => load_schedule(path)?,
        None => Vec::new(),
    };

    let dates = if !args.dates.is_empty() {
        args.dates.clone()
    } else if !schedule.is_empty() {
        match_dates(&schedule)
    } else {
        config.match_dates.clone()
    };

    Ok(RunPlan {
        config,
        dates,
        schedule,
    })
}

/// Resultatet av én kjøring: sesongrapport, skrevne filer og bytteanalyse.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: SeasonReport,
    pub written: Vec<PathBuf>,
    pub write_failures: Vec<MatchFailure>,
    pub substitutions: SubstitutionReport,
}

/// Begge fasene + én output-fil per ratet kamp. En skrivefeil logges og
/// telles; resten av kampene skrives likevel.
pub fn run(plan: &RunPlan) -> RunOutcome {
    let source = DirectorySource::new(&plan.config.data_folder);
    let report = score_season(&source, &plan.dates);

    let mut written = Vec::new();
    let mut write_failures = Vec::new();
    for rating in &report.ratings {
        match write_effort_record(&plan.config.output_folder, rating) {
            Ok(path) => written.push(path),
            Err(e) => {
                log::warn!("⚠️ {}: klarte ikke å skrive rating: {e}", rating.match_date);
                telemetry::record_failed(FailureStage::Write);
                write_failures.push(MatchFailure {
                    match_date: rating.match_date,
                    reason: e.to_string(),
                });
            }
        }
    }

    // Bytteanalysen trenger kampvinduet, så den kjøres bare med sesongplan.
    let substitutions = run_substitutions(
        &source,
        &plan.schedule,
        plan.config.athlete_age,
        &plan.config.output_folder,
    );

    RunOutcome {
        report,
        written,
        write_failures,
        substitutions,
    }
}

pub fn print_season_report(outcome: &RunOutcome, schedule: &[ScheduledMatch]) {
    let report = &outcome.report;
    println!("--- Effort Ratings ---");
    print!("{:<12}", "date");
    for metric in Metric::ALL {
        print!(" {:>10}", short_label(metric));
    }
    println!(" {:>7}  match", "rating");

    for r in &report.ratings {
        print!("{:<12}", r.match_date.format("%Y-%m-%d").to_string());
        for metric in Metric::ALL {
            print!(" {:>10.1}", r.components.get(metric));
        }
        let opponent = schedule
            .iter()
            .find(|m| m.date == r.match_date)
            .map(|m| {
                let venue = if m.is_home() { "H" } else { "A" };
                format!("vs {} ({venue})", m.opponent.as_deref().unwrap_or("?"))
            })
            .unwrap_or_default();
        println!(" {:>7.2}  {}", r.effort_rating, opponent);
    }

    for date in &report.skipped {
        println!("{date}: no data, skipped");
    }
    for f in &report.failed {
        println!("{}: failed: {}", f.match_date, f.reason);
    }
    for f in &outcome.write_failures {
        println!("{}: not written: {}", f.match_date, f.reason);
    }

    let subs = &outcome.substitutions;
    if !schedule.is_empty() {
        println!("--- Substitution Recommendations ---");
        for (date, path, n) in &subs.written {
            println!("{date}: {n} recommendation(s) -> {}", path.display());
        }
        for date in &subs.skipped {
            println!("{date}: no data, skipped");
        }
        for f in &subs.failed {
            println!("{}: failed: {}", f.match_date, f.reason);
        }
    }
}

fn short_label(metric: Metric) -> &'static str {
    match metric {
        Metric::ActiveZoneMinutes => "azm",
        Metric::Calories => "kcal",
        Metric::Distance => "distance",
        Metric::Steps => "steps",
        Metric::AvgHeartRate => "avg_hr",
        Metric::PeakExerciseHeartRate => "peak_hr",
    }
}
