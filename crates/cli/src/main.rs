use anyhow::Context;
use clap::{Parser, Subcommand};
use exit_plan_core::{AppConfig, ConfigLoader};
use std::path::Path;

mod commands;
mod plan_file;
mod report;

use commands::{EntryArgs, ScheduleArgs, WatchArgs};

#[derive(Parser)]
#[command(name = "exit-plan")]
#[command(about = "Staged-exit PnL schedules for futures positions", long_about = None)]
struct Cli {
    /// Config file path (TOML, or JSON when the extension is .json)
    #[arg(short, long, global = true, default_value = "config/Config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a plan file at its mark and print fills and PnL
    Schedule(ScheduleArgs),
    /// Re-price a plan file every time it is saved
    Watch(WatchArgs),
    /// List supported symbols and their point values
    Instruments,
    /// Derive the average entry from current price and open PnL
    Entry(EntryArgs),
}

fn load_config(path: &str) -> anyhow::Result<AppConfig> {
    let path = Path::new(path);
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = if is_json {
        ConfigLoader::load_json(path)
    } else {
        ConfigLoader::load(path)
    };
    config.with_context(|| format!("Failed to load config from {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli.config)?;
    tracing::debug!(
        config = %cli.config,
        instruments = config.instruments.len(),
        "Loaded configuration"
    );

    match cli.command {
        Commands::Schedule(args) => {
            commands::run_schedule(&args, &config)?;
        }
        Commands::Watch(args) => {
            commands::run_watch(&args, &config).await?;
        }
        Commands::Instruments => {
            commands::run_instruments(&config)?;
        }
        Commands::Entry(args) => {
            commands::run_entry(&args, &config)?;
        }
    }

    Ok(())
}
