use std::{
    fmt, io,
    path::{Path, PathBuf},
    result,
};

use thiserror::Error;

use crate::config_store::ConfigError;

/// Error types for starting and wiring the heartbeat service.
///
/// Per-tick failures (rendering, delivery) never surface here; they are
/// logged by the producer loop and the loop continues.
#[derive(Error, Debug)]
pub enum HeartbeatError {
    /// A setting is missing or has an unusable value
    #[error("invalid setting '{field}': {reason}")]
    InvalidSetting {
        /// Name of the offending setting
        field: String,
        /// Why the value was rejected
        reason: String,
    },

    /// I/O operation error with path context
    #[error("I/O error on '{path}': {details}")]
    IoError {
        /// Path where the I/O error occurred
        path: PathBuf,
        /// I/O error details
        details: String,
    },

    /// I/O error without a path, such as a failed signal handler registration
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// TOML parsing error with location context
    #[error("failed to parse TOML at '{location}': {details}")]
    TomlParseError {
        /// Location of TOML being parsed (file path or "string")
        location: String,
        /// Parse error details
        details: String,
    },

    /// The configuration source could not be loaded or watched
    #[error("configuration source error: {0}")]
    ConfigSource(#[from] ConfigError),

    /// Tracing subscriber could not be installed
    #[error("failed to initialize tracing: {0}")]
    Tracing(String),
}

/// A specialized `Result` type for heartbeat operations.
pub type Result<T> = result::Result<T, HeartbeatError>;

impl HeartbeatError {
    /// Creates a TOML parsing error with optional file path context.
    pub fn toml_parse(error: impl fmt::Display, path: Option<&Path>) -> Self {
        let location = match path {
            Some(p) => {
                let clean_path = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
                clean_path.to_string_lossy().to_string()
            }
            None => "string".to_string(),
        };

        HeartbeatError::TomlParseError {
            location,
            details: error.to_string(),
        }
    }

    /// Creates an invalid setting error.
    pub fn invalid_setting(field: &str, reason: impl fmt::Display) -> Self {
        HeartbeatError::InvalidSetting {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}
