use std::{
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use tracing::{debug, info, instrument};

use super::{ConfigPaths, LogFormat, Settings, SinkConfig, duration::parse_duration};
use crate::{HeartbeatError, Result, producer::ProducerConfig};

/// Values supplied on the command line; `None` leaves a setting untouched.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    /// Overrides `interval`.
    pub interval: Option<Duration>,
    /// Overrides `message_template`.
    pub message_template: Option<String>,
    /// Overrides `config_source`.
    pub config_source: Option<PathBuf>,
    /// Overrides `sink`.
    pub sink: Option<SinkConfig>,
    /// Overrides `log_format`.
    pub log_format: Option<LogFormat>,
}

impl Settings {
    /// Loads settings from all layers.
    ///
    /// Uses `path` if given, otherwise the default settings file when it
    /// exists, otherwise defaults only. Environment variables are applied on
    /// top, then `overrides`.
    ///
    /// # Errors
    /// Returns error if an explicit file cannot be read, the TOML is invalid,
    /// or an environment variable holds an unparseable value.
    #[instrument(skip(overrides))]
    pub fn load(path: Option<&Path>, overrides: SettingsOverrides) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => match ConfigPaths::default_settings_file() {
                Ok(default_path) if default_path.exists() => Self::from_file(&default_path)?,
                _ => {
                    debug!("No settings file found, using defaults");
                    Self::default()
                }
            },
        };

        settings.apply_env()?;
        settings.apply_overrides(overrides);

        Ok(settings)
    }

    /// Reads settings from a TOML file.
    ///
    /// # Errors
    /// Returns `HeartbeatError::IoError` if the file cannot be read or
    /// `HeartbeatError::TomlParseError` if it is not valid settings TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading settings from {}", path.display());

        let content = fs::read_to_string(path).map_err(|e| HeartbeatError::IoError {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| HeartbeatError::toml_parse(e, Some(path)))
    }

    /// Applies overrides from the process environment.
    ///
    /// # Errors
    /// Returns `HeartbeatError::InvalidSetting` for unparseable values.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|name| env::var(name).ok())
    }

    /// Applies overrides read through `lookup`.
    ///
    /// Recognized variables: `INTERVAL`, `MESSAGE_TEMPLATE`, `CONFIG_VARS`
    /// (`key:value,key:value`), `CONFIG_SOURCE`, `SEND_TIMEOUT` and
    /// `HEARTBEATS_LOG_FORMAT`. `CONFIG_VARS` is merged into the inline
    /// variables, replacing keys it names.
    ///
    /// # Errors
    /// Returns `HeartbeatError::InvalidSetting` for unparseable values.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("INTERVAL") {
            let interval =
                parse_duration(&raw).map_err(|e| HeartbeatError::invalid_setting("INTERVAL", e))?;
            self.interval = Some(interval);
        }

        if let Some(template) = lookup("MESSAGE_TEMPLATE") {
            self.message_template = Some(template);
        }

        if let Some(raw) = lookup("CONFIG_VARS") {
            self.config_vars.extend(parse_config_vars(&raw)?);
        }

        if let Some(source) = lookup("CONFIG_SOURCE").filter(|s| !s.is_empty()) {
            self.config_source = Some(PathBuf::from(source));
        }

        if let Some(raw) = lookup("SEND_TIMEOUT") {
            let timeout = parse_duration(&raw)
                .map_err(|e| HeartbeatError::invalid_setting("SEND_TIMEOUT", e))?;
            self.send_timeout = Some(timeout);
        }

        if let Some(raw) = lookup("HEARTBEATS_LOG_FORMAT") {
            self.log_format = raw
                .parse()
                .map_err(|e| HeartbeatError::invalid_setting("HEARTBEATS_LOG_FORMAT", e))?;
        }

        Ok(())
    }

    /// Applies command-line overrides.
    pub fn apply_overrides(&mut self, overrides: SettingsOverrides) {
        if let Some(interval) = overrides.interval {
            self.interval = Some(interval);
        }
        if let Some(template) = overrides.message_template {
            self.message_template = Some(template);
        }
        if let Some(source) = overrides.config_source {
            self.config_source = Some(source);
        }
        if let Some(sink) = overrides.sink {
            self.sink = sink;
        }
        if let Some(format) = overrides.log_format {
            self.log_format = format;
        }
    }

    /// Validates the producer-facing settings and extracts them.
    ///
    /// # Errors
    /// Returns `HeartbeatError::InvalidSetting` if the interval or message
    /// template is missing, or if the interval or send timeout is zero.
    pub fn validate(&self) -> Result<ProducerConfig> {
        let interval = self
            .interval
            .ok_or_else(|| HeartbeatError::invalid_setting("interval", "required"))?;

        if interval.is_zero() {
            return Err(HeartbeatError::invalid_setting(
                "interval",
                "must be greater than zero",
            ));
        }

        let message_template = self
            .message_template
            .clone()
            .ok_or_else(|| HeartbeatError::invalid_setting("message_template", "required"))?;

        let send_timeout = self.send_timeout.unwrap_or(interval);
        if send_timeout.is_zero() {
            return Err(HeartbeatError::invalid_setting(
                "send_timeout",
                "must be greater than zero",
            ));
        }

        Ok(ProducerConfig {
            interval,
            message_template,
            send_timeout,
            event_type: self.event_type.clone(),
            event_source: self.event_source.clone(),
        })
    }
}

/// Parses `key:value,key:value` pairs.
///
/// Values may contain further colons; only the first one separates the key.
/// Empty entries are skipped.
fn parse_config_vars(raw: &str) -> Result<BTreeMap<String, String>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (key, value) = entry.split_once(':').ok_or_else(|| {
                HeartbeatError::invalid_setting(
                    "CONFIG_VARS",
                    format!("entry '{entry}' is not of the form key:value"),
                )
            })?;

            let key = key.trim();
            if key.is_empty() {
                return Err(HeartbeatError::invalid_setting(
                    "CONFIG_VARS",
                    format!("entry '{entry}' has an empty key"),
                ));
            }

            Ok((key.to_string(), value.trim().to_string()))
        })
        .collect()
}
