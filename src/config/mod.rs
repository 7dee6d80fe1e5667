//! Process settings for the heartbeat service.
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then environment variables, then command-line overrides. Every layer
//! only replaces the fields it sets.

pub mod duration;
mod loading;
mod log_format;
mod paths;
mod sink;

#[cfg(test)]
mod tests;

use std::{collections::BTreeMap, path::PathBuf, time::Duration};

pub use loading::SettingsOverrides;
pub use log_format::LogFormat;
pub use paths::ConfigPaths;
use serde::{Deserialize, Serialize};
pub use sink::SinkConfig;

/// Event type used when none is configured.
pub const DEFAULT_EVENT_TYPE: &str = "dev.heartbeats.heartbeat";

/// Event source used when none is configured.
pub const DEFAULT_EVENT_SOURCE: &str = "heartbeats/heartbeat-source";

/// Complete settings for one heartbeat process.
///
/// `interval` and `message_template` have no defaults and must be provided
/// by one of the layers; [`Settings::validate`] enforces that.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Pacing of emission, e.g. `"5s"` or `"100ms"`.
    #[serde(with = "duration::serde_duration_opt", skip_serializing_if = "Option::is_none")]
    pub interval: Option<Duration>,

    /// Message text with `{{.name}}` placeholders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_template: Option<String>,

    /// TOML file of variables to watch for updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_source: Option<PathBuf>,

    /// Variables available before the config source is first loaded.
    pub config_vars: BTreeMap<String, String>,

    /// Upper bound for a single delivery attempt. Defaults to the interval.
    #[serde(with = "duration::serde_duration_opt", skip_serializing_if = "Option::is_none")]
    pub send_timeout: Option<Duration>,

    /// Type attribute stamped on every event.
    pub event_type: String,

    /// Source attribute stamped on every event.
    pub event_source: String,

    /// Where events are delivered.
    pub sink: SinkConfig,

    /// Console log format.
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval: None,
            message_template: None,
            config_source: None,
            config_vars: BTreeMap::new(),
            send_timeout: None,
            event_type: DEFAULT_EVENT_TYPE.to_string(),
            event_source: DEFAULT_EVENT_SOURCE.to_string(),
            sink: SinkConfig::default(),
            log_format: LogFormat::default(),
        }
    }
}
