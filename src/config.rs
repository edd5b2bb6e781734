use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://auto-com-center-jamarrlmayes.replit.app/api/events";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Log level for the file logger
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

/// Main fleet-sim configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Ingestion endpoint events are POSTed to
    pub endpoint: String,
    /// Bearer credential; empty means no Authorization header
    pub api_key: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_level: LogLevel::default(),
        }
    }
}

/// Overrides taken from the command line, applied last
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration: file fallback chain, then environment, then CLI overrides
    pub fn load(config_path: Option<&PathBuf>, overrides: &Overrides) -> Result<Self> {
        let mut config = Self::load_file(config_path)?;
        config.apply_env(|name| std::env::var(name).ok());
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would fail every request
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            eyre::bail!("timeout_secs must be at least 1");
        }
        if self.endpoint.is_empty() {
            eyre::bail!("endpoint must not be empty");
        }
        Ok(())
    }

    fn load_file(config_path: Option<&PathBuf>) -> Result<Self> {
        // Explicit path must load
        if let Some(path) = config_path {
            let path = Self::expand_path(path);
            return Self::load_from_file(&path).context(format!("Failed to load config from {}", path.display()));
        }

        if let Ok(env_path) = std::env::var("FLEET_SIM_CONFIG") {
            let path = Self::expand_path(Path::new(&env_path));
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => log::warn!("Failed to load config from FLEET_SIM_CONFIG: {}", e),
                }
            }
        }

        let mut candidates = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("fleet-sim").join("fleet-sim.yaml"));
        }
        // For development
        candidates.push(PathBuf::from("fleet-sim.yaml"));

        for path in candidates {
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => log::warn!("Failed to load config from {}: {}", path.display(), e),
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply environment variables through `lookup`.
    ///
    /// `A8_KEY` wins whenever it is set, even to an empty string; `S2S_API_KEY`
    /// is only consulted when `A8_KEY` is absent.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("A8_URL") {
            self.endpoint = url;
        }
        if let Some(key) = lookup("A8_KEY").or_else(|| lookup("S2S_API_KEY")) {
            self.api_key = key;
        }
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(ref endpoint) = overrides.endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(ref key) = overrides.api_key {
            self.api_key = key.clone();
        }
        if let Some(secs) = overrides.timeout_secs {
            self.timeout_secs = secs;
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Copy safe to print: the API key is replaced with a mask
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.has_api_key() {
            copy.api_key = "********".to_string();
        }
        copy
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}
