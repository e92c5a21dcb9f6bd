//! `schedule` and `watch` commands.
//!
//! Both load a plan file, price it at a mark and print the result. `watch`
//! keeps running and re-prices every time the plan file is saved.

use anyhow::{Context, Result};
use clap::Args;
use exit_plan_core::{AppConfig, ConfigWatcher, ScheduleCalculator};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

use crate::plan_file::PlanFile;
use crate::report::{ReportFormatter, ScheduleReport};

/// Arguments for the schedule command.
#[derive(Args, Debug, Clone)]
pub struct ScheduleArgs {
    /// Plan file (TOML, or JSON when the extension is .json)
    #[arg(long)]
    pub plan: PathBuf,

    /// Mark price overriding the plan's own mark
    #[arg(long, allow_hyphen_values = true)]
    pub mark: Option<Decimal>,

    /// Print fills, summary and grid roll-ups as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the watch command.
#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    /// Plan file to re-price on every save
    #[arg(long)]
    pub plan: PathBuf,

    /// Mark price overriding the plan's own mark
    #[arg(long, allow_hyphen_values = true)]
    pub mark: Option<Decimal>,
}

/// Prices a plan file once and prints the schedule.
///
/// # Errors
///
/// Returns an error if the plan cannot be read or the schedule is invalid.
pub fn run_schedule(args: &ScheduleArgs, config: &AppConfig) -> Result<()> {
    let calculator = ScheduleCalculator::from_config(config)?;
    let file = PlanFile::load(&args.plan)?;
    let report = price(&calculator, &file, args.mark)
        .with_context(|| format!("Failed to price {}", args.plan.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", ReportFormatter::format(&report));
    }

    Ok(())
}

/// Prints the schedule, then re-prints it whenever the plan file changes
/// until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the initial plan is unreadable or the file cannot be watched.
pub async fn run_watch(args: &WatchArgs, config: &AppConfig) -> Result<()> {
    let calculator = ScheduleCalculator::from_config(config)?;
    let initial = PlanFile::load(&args.plan)?;
    render(&calculator, &initial, args.mark, &args.plan);

    let (watcher, mut rx) = ConfigWatcher::new(initial);
    let watching = watcher.watch(&args.plan, PlanFile::load);
    tokio::pin!(watching);

    tracing::info!(plan = %args.plan.display(), "Watching plan file, Ctrl+C to stop");

    loop {
        tokio::select! {
            result = &mut watching => {
                result?;
                break;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let file = rx.borrow_and_update().clone();
                render(&calculator, &file, args.mark, &args.plan);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// Builds the full report for one plan file at the resolved mark.
///
/// # Errors
///
/// Returns the core error for an invalid plan or unknown symbol.
pub fn price(
    calculator: &ScheduleCalculator<exit_plan_core::PointValueTable>,
    file: &PlanFile,
    mark: Option<Decimal>,
) -> exit_plan_core::Result<ScheduleReport> {
    let plan = file.to_plan(calculator.resolver(), mark)?;
    let (fills, summary) = calculator.compute(&plan)?;
    Ok(ScheduleReport::new(fills, summary))
}

fn render(
    calculator: &ScheduleCalculator<exit_plan_core::PointValueTable>,
    file: &PlanFile,
    mark: Option<Decimal>,
    path: &Path,
) {
    match price(calculator, file, mark) {
        Ok(report) => print!("{}", ReportFormatter::format(&report)),
        Err(e) => tracing::error!("Failed to price {}: {}", path.display(), e),
    }
}
