//! Canary run: three fixed events in order, then a pass/fail summary

use chrono::{DateTime, Utc};
use colored::*;
use eyre::Result;
use serde::Serialize;
use serde_json::{Value, json};

use crate::config::Config;
use crate::emit::{Context, DEFAULT_SOURCE_APP, EmissionResult, EventEmitter, EventKind};

pub const CANARY_USER_HASH: &str = "sha256_canary_user_001";

/// One fixed event: kind, simulated origin and context
#[derive(Debug, Clone)]
pub struct Template {
    pub kind: EventKind,
    pub source_app: &'static str,
    pub context: Context,
}

fn context<const N: usize>(pairs: [(&str, Value); N]) -> Context {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// Template for `kind`; `now_secs` seeds the lead and payment identifiers
pub fn template(kind: EventKind, now_secs: i64) -> Template {
    match kind {
        // Signup from scholar_auth
        EventKind::NewUser => Template {
            kind,
            source_app: "scholar_auth",
            context: context([
                ("user_id_hash", json!(CANARY_USER_HASH)),
                ("signup_source", json!("organic")),
                ("utm_source", json!("auto_page_maker")),
                ("utm_campaign", json!("canary_test")),
            ]),
        },
        // Lead captured by auto_page_maker
        EventKind::NewLead => Template {
            kind,
            source_app: DEFAULT_SOURCE_APP,
            context: context([
                ("lead_id", json!(format!("lead_{}", now_secs))),
                ("page_slug", json!("/scholarships/nursing")),
                ("utm_source", json!("google")),
                ("utm_medium", json!("organic")),
                ("referrer", json!("google.com")),
            ]),
        },
        // Test-mode payment from student_pilot
        EventKind::PaymentSuccess => Template {
            kind,
            source_app: "student_pilot",
            context: context([
                ("payment_id", json!(format!("pay_{}", now_secs))),
                ("amount_cents", json!(100)),
                ("currency", json!("usd")),
                ("mode", json!("test")),
                ("user_id_hash", json!(CANARY_USER_HASH)),
            ]),
        },
    }
}

/// The three canary events, in emission order
pub fn canary_events(now_secs: i64) -> Vec<Template> {
    [EventKind::NewUser, EventKind::NewLead, EventKind::PaymentSuccess]
        .into_iter()
        .map(|kind| template(kind, now_secs))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub endpoint: String,
    pub results: Vec<EmissionResult>,
    pub all_persisted: bool,
}

impl RunSummary {
    pub fn new(started_at: DateTime<Utc>, endpoint: &str, results: Vec<EmissionResult>) -> Self {
        let all_persisted = results.iter().all(|r| r.persisted());
        Self {
            started_at,
            endpoint: endpoint.to_string(),
            results,
            all_persisted,
        }
    }

    /// 0 when every event was persisted, 1 otherwise
    pub fn exit_code(&self) -> u8 {
        if self.all_persisted { 0 } else { 1 }
    }
}

/// Emit the canary events sequentially and collect their results
pub fn run(emitter: &EventEmitter, started_at: DateTime<Utc>) -> Result<RunSummary> {
    let mut results = Vec::new();

    for template in canary_events(started_at.timestamp()) {
        let result = emitter.emit(template.kind, template.context, template.source_app)?;
        results.push(result);
    }

    let summary = RunSummary::new(started_at, emitter.endpoint(), results);
    log::info!(
        "Run finished: {}/{} persisted",
        summary.results.iter().filter(|r| r.persisted()).count(),
        summary.results.len()
    );
    Ok(summary)
}

fn rule() -> String {
    "=".repeat(60)
}

pub fn print_banner(config: &Config, started_at: DateTime<Utc>) {
    println!("{}", rule());
    println!("{}", "Fleet Event Simulator - v3.5.1 Protocol".bold());
    println!("{}", rule());
    println!("Target: {}", config.endpoint);
    println!(
        "Auth: {}",
        if config.has_api_key() { "Bearer token configured" } else { "No auth token" }
    );
    println!("Time: {}", started_at.format("%Y-%m-%dT%H:%M:%S%.6fZ"));
}

pub fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", rule());
    println!("{}", "SUMMARY".bold());
    println!("{}", rule());

    for result in &summary.results {
        let mark = if result.persisted() { "✅" } else { "❌" };
        println!("{} {}: persisted={}", mark, result.event_id, result.persisted());
    }

    println!();
    println!("{}", rule());
    if summary.all_persisted {
        println!("{}", "RESULT: ALL EVENTS PERSISTED - READY FOR DEMO MODE".green());
    } else {
        println!("{}", "RESULT: SOME EVENTS FAILED - CHECK A8 LOGS".red());
    }
    println!("{}", rule());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MockEndpoint, Reply, unreachable_url};
    use std::collections::HashSet;

    const PERSISTED: &str = r#"{"persisted": true}"#;
    const NOT_PERSISTED: &str = r#"{"persisted": false}"#;

    fn emitter_for(endpoint: &str) -> EventEmitter {
        let config = Config {
            endpoint: endpoint.to_string(),
            timeout_secs: 5,
            ..Config::default()
        };
        EventEmitter::new(&config, false)
    }

    #[test]
    fn test_canary_table() {
        let events = canary_events(1_700_000_000);
        let table: Vec<(&str, &str)> = events.iter().map(|t| (t.kind.as_str(), t.source_app)).collect();

        assert_eq!(
            table,
            vec![
                ("NewUser", "scholar_auth"),
                ("NewLead", "auto_page_maker"),
                ("PaymentSuccess", "student_pilot"),
            ]
        );
    }

    #[test]
    fn test_canary_contexts() {
        let events = canary_events(1_700_000_000);

        assert_eq!(events[0].context["user_id_hash"], CANARY_USER_HASH);
        assert_eq!(events[1].context["lead_id"], "lead_1700000000");
        assert_eq!(events[1].context["page_slug"], "/scholarships/nursing");
        assert_eq!(events[2].context["payment_id"], "pay_1700000000");
        assert_eq!(events[2].context["amount_cents"], 100);
        assert_eq!(events[2].context["mode"], "test");
        // Payment links back to the signup
        assert_eq!(events[2].context["user_id_hash"], events[0].context["user_id_hash"]);
    }

    #[test]
    fn test_all_persisted_exits_zero() {
        let mock = MockEndpoint::serve(vec![
            Reply::body(200, PERSISTED),
            Reply::body(200, PERSISTED),
            Reply::body(200, PERSISTED),
        ]);

        let summary = run(&emitter_for(&mock.url), Utc::now()).unwrap();

        assert!(summary.all_persisted);
        assert_eq!(summary.exit_code(), 0);

        let sent: Vec<(String, String)> = mock
            .requests()
            .iter()
            .map(|r| {
                let body = r.json();
                (
                    body["event_type"].as_str().unwrap().to_string(),
                    body["source_app_id"].as_str().unwrap().to_string(),
                )
            })
            .collect();
        assert_eq!(
            sent,
            vec![
                ("NewUser".to_string(), "scholar_auth".to_string()),
                ("NewLead".to_string(), "auto_page_maker".to_string()),
                ("PaymentSuccess".to_string(), "student_pilot".to_string()),
            ]
        );
    }

    #[test]
    fn test_one_not_persisted_exits_one() {
        let mock = MockEndpoint::serve(vec![
            Reply::body(200, PERSISTED),
            Reply::body(200, NOT_PERSISTED),
            Reply::body(200, PERSISTED),
        ]);

        let summary = run(&emitter_for(&mock.url), Utc::now()).unwrap();

        assert_eq!(summary.results.len(), 3);
        assert!(!summary.results[1].persisted());
        assert!(!summary.all_persisted);
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn test_hangup_is_captured_and_run_continues() {
        let mock = MockEndpoint::serve(vec![
            Reply::body(200, PERSISTED),
            Reply::Hangup,
            Reply::body(200, PERSISTED),
        ]);

        let summary = run(&emitter_for(&mock.url), Utc::now()).unwrap();

        assert_eq!(summary.results.len(), 3);
        assert_eq!(summary.results[1].status, 0);
        assert!(summary.results[1].error.is_some());
        assert!(summary.results[2].persisted());
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn test_unreachable_endpoint_attempts_every_event() {
        let summary = run(&emitter_for(&unreachable_url()), Utc::now()).unwrap();

        assert_eq!(summary.results.len(), 3);
        assert!(summary.results.iter().all(|r| r.status == 0 && r.error.is_some()));
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn test_event_ids_pairwise_distinct() {
        let summary = run(&emitter_for(&unreachable_url()), Utc::now()).unwrap();
        let ids: HashSet<&str> = summary.results.iter().map(|r| r.event_id.as_str()).collect();
        assert_eq!(ids.len(), 3);
    }
}
