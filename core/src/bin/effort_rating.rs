use anyhow::Context;
use clap::Parser;

use effortrating_core::cli::{print_season_report, resolve_plan, run, Args};
use effortrating_core::{telemetry, PipelineConfig};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = PipelineConfig::load(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;
    let plan = resolve_plan(&args, config).context("resolving match dates")?;

    let outcome = run(&plan);
    print_season_report(&outcome, &plan.schedule);

    if args.metrics {
        print!("{}", telemetry::gather_text());
    }
    if !outcome.write_failures.is_empty() {
        anyhow::bail!(
            "{} of {} effort ratings could not be written",
            outcome.write_failures.len(),
            outcome.report.ratings.len()
        );
    }
    Ok(())
}
