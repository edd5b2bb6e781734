use colored::*;
use eyre::Result;

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::Config;

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(format, config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    let config = config.redacted();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(&config)?);
        }
        OutputFormat::Text => {
            println!("{}", "fleet-sim Configuration".bold());
            println!();
            println!("  {}: {}", "endpoint".cyan(), config.endpoint);
            println!(
                "  {}: {}",
                "api_key".cyan(),
                if config.api_key.is_empty() { "(none)" } else { config.api_key.as_str() }
            );
            println!("  {}: {}s", "timeout".cyan(), config.timeout_secs);
            println!("  {}: {}", "log_level".cyan(), config.log_level.as_filter());
        }
    }

    Ok(())
}
