//! Single-event command

use chrono::Utc;
use colored::*;
use eyre::Result;
use std::process::ExitCode;

use crate::config::Config;
use crate::emit::{EventEmitter, EventKind};
use crate::simulate;

pub fn run(kind: EventKind, source: Option<&str>, quiet: bool, config: &Config) -> Result<ExitCode> {
    let emitter = EventEmitter::new(config, !quiet);
    let template = simulate::template(kind, Utc::now().timestamp());
    let source_app = source.unwrap_or(template.source_app);

    let result = emitter.emit(kind, template.context, source_app)?;

    if result.persisted() {
        println!("{} {}: persisted=true", "✅".green(), result.event_id);
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{} {}: persisted=false", "❌".red(), result.event_id);
        Ok(ExitCode::from(1))
    }
}
