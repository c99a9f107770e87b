//! Codec Configuration
//!
//! Parse options shared by codec pipelines and the log threshold. Every key is
//! optional; a missing key takes its default.
//!
//! ```json
//! {
//!   "parse": { "on_excess_property": "error", "null_as_absent": true },
//!   "log_level": "TRACE"
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{log_event, Event, Logger, Severity};
use crate::schema::ParseOptions;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Content is not valid configuration JSON
    #[error("Malformed config: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Codec configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Options used by every encode/decode step
    #[serde(default)]
    pub parse: ParseOptions,

    /// Lowest severity written to the log (default: INFO)
    #[serde(default)]
    pub log_level: Severity,
}

impl CodecConfig {
    /// Create a config with the given parse options
    pub fn with_parse(parse: ParseOptions) -> Self {
        Self {
            parse,
            ..Default::default()
        }
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Install the log threshold
    pub fn apply(&self) {
        Logger::set_min_severity(self.log_level);
        log_event(Event::ConfigLoaded, &[("log_level", self.log_level.as_str())]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ExcessProperty;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.parse, ParseOptions::default());
        assert_eq!(config.log_level, Severity::Info);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = CodecConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CodecConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config =
            CodecConfig::from_json_str(r#"{"parse": {"on_excess_property": "error"}, "log_level": "WARN"}"#)
                .unwrap();
        assert_eq!(config.parse.on_excess_property, ExcessProperty::Error);
        assert!(config.parse.null_as_absent);
        assert_eq!(config.log_level, Severity::Warn);
    }

    #[test]
    fn test_malformed_document() {
        let err = CodecConfig::from_json_str(r#"{"log_level": "LOUD"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"parse": {{"null_as_absent": false}}}}"#).unwrap();

        let config = CodecConfig::load(file.path()).unwrap();
        assert!(!config.parse.null_as_absent);
        assert_eq!(config.parse.on_excess_property, ExcessProperty::Ignore);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = CodecConfig::load(dir.path().join("codec.json")).unwrap_err();
        match err {
            ConfigError::Io { path, .. } => assert!(path.ends_with("codec.json")),
            other => panic!("expected io error, got {:?}", other),
        }
    }
}
