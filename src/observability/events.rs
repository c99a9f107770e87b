//! Observable codec events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Events emitted by the codec pipeline and configuration loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Caller input violated the encoder schema
    QueryEncodeFailed,
    /// The wrapped operation rejected
    QueryExecuteFailed,
    /// The operation's result violated the decoder schema
    QueryDecodeFailed,
    /// Configuration applied
    ConfigLoaded,
}

impl Event {
    /// Returns the event name as written to the log
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::QueryEncodeFailed => "QUERY_ENCODE_FAILED",
            Event::QueryExecuteFailed => "QUERY_EXECUTE_FAILED",
            Event::QueryDecodeFailed => "QUERY_DECODE_FAILED",
            Event::ConfigLoaded => "CONFIG_LOADED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::QueryEncodeFailed | Event::QueryExecuteFailed | Event::QueryDecodeFailed => {
                Severity::Trace
            }
            Event::ConfigLoaded => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
