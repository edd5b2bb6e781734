//! Event model: kinds, payloads, correlation IDs

use chrono::Utc;
use clap::ValueEnum;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source app whose base URL is fixed rather than derived
pub const DEFAULT_SOURCE_APP: &str = "auto_page_maker";
pub const DEFAULT_APP_BASE_URL: &str = "https://auto-page-maker-jamarrlmayes.replit.app";
const APP_HOST_SUFFIX: &str = "-jamarrlmayes.replit.app";

/// Event context: insertion-ordered, shape varies by event kind
pub type Context = IndexMap<String, serde_json::Value>;

/// Business event kinds understood by the ingestion endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum EventKind {
    NewUser,
    NewLead,
    PaymentSuccess,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::NewUser => "NewUser",
            EventKind::NewLead => "NewLead",
            EventKind::PaymentSuccess => "PaymentSuccess",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body sent for a single emission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventKind,
    pub source_app_id: String,
    pub app_base_url: String,
    /// Epoch milliseconds
    pub ts: i64,
    pub context: Context,
}

impl Event {
    pub fn new(kind: EventKind, context: Context, source_app: &str) -> eyre::Result<Self> {
        if source_app.is_empty() {
            eyre::bail!("Source app must not be empty");
        }

        Ok(Self {
            event_type: kind,
            source_app_id: source_app.to_string(),
            app_base_url: app_base_url(source_app),
            ts: Utc::now().timestamp_millis(),
            context,
        })
    }
}

/// Base URL of the app an event claims to come from
pub fn app_base_url(source_app: &str) -> String {
    if source_app == DEFAULT_SOURCE_APP {
        DEFAULT_APP_BASE_URL.to_string()
    } else {
        format!("https://{}{}", source_app.replace('_', "-"), APP_HOST_SUFFIX)
    }
}

/// Correlation ID: `<event_type>-<unix seconds>-<8 random hex chars>`
pub fn new_event_id(kind: EventKind) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", kind, Utc::now().timestamp(), &suffix[..8])
}
