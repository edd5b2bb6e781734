use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::Overrides;
use crate::emit::EventKind;

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

#[derive(Parser)]
#[command(
    name = "fleet-sim",
    about = "Fleet Event Simulator - emits canary NewUser, NewLead and PaymentSuccess events",
    version,
    after_help = "Logs are written to: ~/.local/share/fleet-sim/logs/fleet-sim.log\n\nEnvironment: A8_URL, A8_KEY (falls back to S2S_API_KEY), FLEET_SIM_CONFIG"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to fleet-sim.yaml config file")]
    pub config: Option<PathBuf>,

    /// Ingestion endpoint (overrides A8_URL and config)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Bearer credential (overrides A8_KEY and config)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds (at least 1)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Suppress per-event progress output
    #[arg(short, long, global = true, help = "Suppress per-event progress output")]
    pub quiet: bool,

    /// Defaults to `run`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
            timeout_secs: self.timeout,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Emit the three canary events and report whether each was persisted
    Run {
        /// Output format for the summary
        #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Print the events and headers that would be sent, without sending
        #[arg(long)]
        dry_run: bool,
    },

    /// Emit a single canary event
    Emit {
        /// Event to emit
        #[arg(value_enum)]
        event: EventKind,

        /// Override the simulated source app
        #[arg(long)]
        source: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the resolved configuration (API key masked)
    Show {
        #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}
