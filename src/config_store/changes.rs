use std::{path::PathBuf, time::Instant};

/// A single variable that differs between two snapshots.
///
/// `old_value` is `None` when the variable was added, `new_value` is `None`
/// when it was removed.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigChange {
    /// Name of the variable that changed.
    pub key: String,
    /// The previous value, if the variable existed before.
    pub old_value: Option<String>,
    /// The new value, if the variable still exists.
    pub new_value: Option<String>,
    /// Timestamp when the change was detected.
    pub timestamp: Instant,
}

impl ConfigChange {
    /// Creates a new configuration change.
    ///
    /// # Arguments
    ///
    /// * `key` - Name of the variable
    /// * `old_value` - The previous value, if any
    /// * `new_value` - The new value, if any
    pub fn new(key: String, old_value: Option<String>, new_value: Option<String>) -> Self {
        Self {
            key,
            old_value,
            new_value,
            timestamp: Instant::now(),
        }
    }

    /// Returns true if the variable did not exist in the previous snapshot.
    pub fn is_added(&self) -> bool {
        self.old_value.is_none() && self.new_value.is_some()
    }

    /// Returns true if the variable no longer exists.
    pub fn is_removed(&self) -> bool {
        self.new_value.is_none()
    }
}

/// Errors raised while reading, decoding or watching a configuration source.
///
/// None of these ever reach the store: a source that fails to decode leaves
/// the currently installed snapshot in place.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to parse TOML content
    #[error("failed to parse TOML from {location}: {details}")]
    TomlParseError {
        /// Location of the TOML (file path, "string", etc.)
        location: String,
        /// Parse error details
        details: String,
    },

    /// A variable has a value that cannot be flattened to a string
    #[error("invalid value for variable '{key}': {reason}")]
    InvalidValue {
        /// Variable name
        key: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Failed to initialize file watcher
    #[error("failed to initialize file watcher: {details}")]
    FileWatcherInitError {
        /// File watcher initialization error details
        details: String,
    },

    /// Error occurred while watching a specific file
    #[error("file watcher error for '{path}': {details}")]
    FileWatchError {
        /// Path being watched when error occurred
        path: PathBuf,
        /// File watcher error details
        details: String,
    },

    /// Error occurred during file I/O operations
    #[error("I/O error on '{path}': {details}")]
    IoError {
        /// Path where I/O error occurred
        path: PathBuf,
        /// I/O error details
        details: String,
    },
}
