//! Observability subsystem for aerodb-codec
//!
//! Structured JSON logging of codec events.
//!
//! # Principles
//!
//! 1. Observability is read-only: logging never changes a pipeline's result
//! 2. No async or background threads
//! 3. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use aerodb_codec::observability::{log_event, Event, Logger, Severity};
//!
//! Logger::set_min_severity(Severity::Trace);
//! log_event(Event::QueryExecuteFailed, &[("error", "QueryError")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log an event at its own severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
