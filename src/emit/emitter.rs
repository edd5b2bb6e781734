//! Single-shot HTTP emitter

use colored::*;
use eyre::Result;
use serde::Serialize;
use std::time::Instant;

use super::event::{Context, Event, EventKind, new_event_id};
use crate::config::Config;

pub const PROTOCOL_VERSION: &str = "v3.5.1";

/// Outcome of one emission
#[derive(Debug, Clone, Serialize)]
pub struct EmissionResult {
    pub event_id: String,
    pub event_type: EventKind,
    pub source_app: String,
    /// Parsed response body, if one was received and parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
    /// HTTP status; 0 when no parseable response arrived
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EmissionResult {
    /// True only when the endpoint answered with `"persisted": true`
    pub fn persisted(&self) -> bool {
        self.response
            .as_ref()
            .and_then(|r| r.get("persisted"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

/// Everything needed to send one event, built before any I/O
#[derive(Debug, Clone, Serialize)]
pub struct PreparedEmission {
    pub event_id: String,
    pub headers: Vec<(String, String)>,
    pub event: Event,
}

/// Emits events to the configured endpoint, one POST per call, no retries
pub struct EventEmitter {
    agent: ureq::Agent,
    endpoint: String,
    api_key: String,
    echo: bool,
}

impl EventEmitter {
    /// Create an emitter; `echo` controls the progress lines on stdout
    pub fn new(config: &Config, echo: bool) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            echo,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Header set for one emission
    pub fn headers(&self, source_app: &str, event_id: &str) -> Vec<(String, String)> {
        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("x-scholar-protocol".to_string(), PROTOCOL_VERSION.to_string()),
            ("x-app-label".to_string(), source_app.to_string()),
            ("x-event-id".to_string(), event_id.to_string()),
        ];

        if !self.api_key.is_empty() {
            headers.push(("Authorization".to_string(), format!("Bearer {}", self.api_key)));
        }

        headers
    }

    /// Build the payload and headers without sending
    pub fn prepare(&self, kind: EventKind, context: Context, source_app: &str) -> Result<PreparedEmission> {
        let event = Event::new(kind, context, source_app)?;
        let event_id = new_event_id(kind);
        let headers = self.headers(source_app, &event_id);

        Ok(PreparedEmission {
            event_id,
            headers,
            event,
        })
    }

    /// Emit one event.
    ///
    /// Transport failures and unreadable bodies are captured in the result;
    /// only an invalid event (empty source) is returned as an error.
    pub fn emit(&self, kind: EventKind, context: Context, source_app: &str) -> Result<EmissionResult> {
        let prepared = self.prepare(kind, context, source_app)?;
        Ok(self.send(prepared))
    }

    /// Send a prepared emission exactly once
    pub fn send(&self, prepared: PreparedEmission) -> EmissionResult {
        let PreparedEmission {
            event_id,
            headers,
            event,
        } = prepared;

        if self.echo {
            println!();
            println!(">>> Emitting {} (ID: {})", event.event_type.to_string().bold(), event_id);
            println!("    Source: {}", event.source_app_id);
        }

        let mut result = EmissionResult {
            event_id,
            event_type: event.event_type,
            source_app: event.source_app_id.clone(),
            response: None,
            status: 0,
            error: None,
        };

        let started = Instant::now();
        match self.post(&event, &headers) {
            // Status is kept only for a parsed body; an unreadable one counts as no response
            Ok((status, body)) => match serde_json::from_str::<serde_json::Value>(&body) {
                Ok(value) => {
                    if self.echo {
                        let pretty = serde_json::to_string_pretty(&value).unwrap_or_else(|_| body.clone());
                        println!("    Response: {}", pretty);
                    }
                    result.status = status;
                    result.response = Some(value);
                }
                Err(e) => {
                    log::warn!("Emission {} got unparseable body (HTTP {}): {}", result.event_id, status, e);
                    result.error = Some(format!("Failed to parse response: {}", e));
                }
            },
            Err(e) => {
                log::warn!("Emission {} failed: {}", result.event_id, e);
                result.error = Some(e);
            }
        }

        if let Some(ref error) = result.error
            && self.echo
        {
            println!("    {} {}", "ERROR:".red(), error);
        }

        log::info!(
            "Emitted {} id={} status={} persisted={} elapsed={:?}",
            result.event_type,
            result.event_id,
            result.status,
            result.persisted(),
            started.elapsed()
        );

        result
    }

    fn post(&self, event: &Event, headers: &[(String, String)]) -> Result<(u16, String), String> {
        let body = serde_json::to_string(event).map_err(|e| e.to_string())?;
        log::debug!("POST {} body={}", self.endpoint, body);

        let mut request = self.agent.post(self.endpoint.as_str());
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let mut response = request
            .send(body.as_bytes())
            .map_err(|e| format!("HTTP request failed: {}", e))?;

        let status = response.status().as_u16();
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| format!("Failed to read response: {}", e))?;

        Ok((status, text))
    }
}
