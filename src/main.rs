use clap::Parser;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;
mod commands;
mod config;
mod emit;
mod simulate;
#[cfg(test)]
mod testutil;

use cli::{Cli, Commands, OutputFormat};
use config::{Config, LogLevel};

fn level_filter(log_level: &LogLevel) -> log::LevelFilter {
    match log_level {
        LogLevel::Trace => log::LevelFilter::Trace,
        LogLevel::Debug => log::LevelFilter::Debug,
        LogLevel::Info => log::LevelFilter::Info,
        LogLevel::Warn => log::LevelFilter::Warn,
        LogLevel::Error => log::LevelFilter::Error,
        LogLevel::Off => log::LevelFilter::Off,
    }
}

/// Send log records to `<data dir>/fleet-sim/logs/fleet-sim.log`; stdout stays the run report
fn setup_logging(log_level: &LogLevel) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fleet-sim")
        .join("logs");
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("fleet-sim.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .context("Failed to open log file")?;

    let from_env = std::env::var("RUST_LOG").is_ok();
    let mut builder = env_logger::Builder::new();
    if from_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(level_filter(log_level));
    }
    builder.target(env_logger::Target::Pipe(Box::new(file))).init();

    info!(
        "fleet-sim {} logging to {} at {}",
        env!("CARGO_PKG_VERSION"),
        log_file.display(),
        if from_env { "RUST_LOG" } else { log_level.as_filter() }
    );
    Ok(())
}

fn run(cli: Cli, config: Config) -> Result<ExitCode> {
    let quiet = cli.quiet;
    match cli.command {
        None => commands::run::run(OutputFormat::Text, false, quiet, &config),
        Some(Commands::Run { format, dry_run }) => commands::run::run(format, dry_run, quiet, &config),
        Some(Commands::Emit { event, source }) => commands::emit::run(event, source.as_deref(), quiet, &config),
        Some(Commands::Config { action }) => commands::config::run(action, &config).map(|_| ExitCode::SUCCESS),
        Some(Commands::Completions { shell }) => commands::completions::run(shell).map(|_| ExitCode::SUCCESS),
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref(), &cli.overrides()).context("Failed to load configuration")?;

    setup_logging(&config.log_level).context("Failed to setup logging")?;

    info!("Starting fleet-sim against {}", config.endpoint);

    run(cli, config).context("Command failed")
}
