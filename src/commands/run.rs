//! Canary run command

use chrono::Utc;
use colored::*;
use eyre::{Context, Result};
use std::process::ExitCode;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::emit::{EventEmitter, PreparedEmission};
use crate::simulate::{self, RunSummary};

pub fn run(format: OutputFormat, dry_run: bool, quiet: bool, config: &Config) -> Result<ExitCode> {
    let text = format == OutputFormat::Text;
    let emitter = EventEmitter::new(config, text && !quiet);
    let started_at = Utc::now();

    if dry_run {
        return preview(&emitter, format, started_at.timestamp());
    }

    if text {
        simulate::print_banner(config, started_at);
    }

    let summary = simulate::run(&emitter, started_at)?;
    report(&summary, format)?;

    Ok(ExitCode::from(summary.exit_code()))
}

fn report(summary: &RunSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => simulate::print_summary(summary),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(summary).context("Failed to serialize summary")?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(summary).context("Failed to serialize summary")?);
        }
    }
    Ok(())
}

/// Show what a run would send; nothing goes over the wire
fn preview(emitter: &EventEmitter, format: OutputFormat, now_secs: i64) -> Result<ExitCode> {
    let mut prepared = Vec::new();
    for template in simulate::canary_events(now_secs) {
        prepared.push(emitter.prepare(template.kind, template.context, template.source_app)?);
    }
    for emission in &mut prepared {
        mask_authorization(emission);
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&prepared)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&prepared)?),
        OutputFormat::Text => {
            println!("{} POST {}", "Dry run:".yellow(), emitter.endpoint());
            for emission in &prepared {
                println!();
                println!(">>> {} (ID: {})", emission.event.event_type.to_string().bold(), emission.event_id);
                for (name, value) in &emission.headers {
                    println!("    {}: {}", name.dimmed(), value);
                }
                println!("    {}", serde_json::to_string_pretty(&emission.event)?);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn mask_authorization(emission: &mut PreparedEmission) {
    for (name, value) in emission.headers.iter_mut() {
        if name == "Authorization" {
            *value = "Bearer ********".to_string();
        }
    }
}
