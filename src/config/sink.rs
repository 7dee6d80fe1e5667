use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where produced events are delivered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SinkConfig {
    /// Emit each event as a structured log record.
    #[default]
    Log,

    /// Write each event as one JSON line on standard output.
    Stdout,

    /// Append each event as one JSON line to a file.
    File {
        /// File receiving the events; created if missing.
        path: PathBuf,
    },
}
