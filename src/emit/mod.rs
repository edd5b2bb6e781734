//! Event emission to the ingestion endpoint
//!
//! - `event` builds the wire payload and correlation IDs
//! - `emitter` POSTs one event per call and captures the outcome

pub mod emitter;
pub mod event;

pub use emitter::{EmissionResult, EventEmitter, PreparedEmission};
pub use event::{Context, DEFAULT_SOURCE_APP, EventKind};
