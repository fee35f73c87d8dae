//! Error types for configuration loading and export.
//!
//! The engines themselves never fail: malformed runtime conditions degrade
//! into report content. Errors exist only at the configuration boundary
//! (reading and parsing TOML inputs) and in the serialization helpers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid {what} configuration: {message}")]
    Config { what: &'static str, message: String },

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CoreError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
