use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::Duration,
};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use toml::Value;
use tracing::{debug, error, info, instrument, warn};

use super::{ConfigError, ConfigSnapshot, ConfigStore, file_watcher::FileWatcher};

const RELOAD_DEBOUNCE: Duration = Duration::from_millis(250);

/// A TOML file of variables that feeds a [`ConfigStore`].
///
/// The file must be a flat table. Strings are taken verbatim, while
/// integers, floats and booleans are rendered with their TOML spelling.
/// Anything else is rejected and the store keeps its current snapshot.
#[derive(Clone)]
pub struct ConfigSource {
    path: PathBuf,
    store: ConfigStore,
}

impl ConfigSource {
    /// Creates a source that will publish into `store`.
    pub fn new(path: impl Into<PathBuf>, store: ConfigStore) -> Self {
        Self {
            path: path.into(),
            store,
        }
    }

    /// Path of the watched file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and decodes the file, then replaces the store's snapshot.
    ///
    /// # Errors
    /// Returns `ConfigError::IoError` if the file cannot be read, or a decode
    /// error if its content is not a flat table of scalars. The store is left
    /// untouched on error.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<ConfigSnapshot, ConfigError> {
        let content =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|e| ConfigError::IoError {
                    path: self.path.clone(),
                    details: e.to_string(),
                })?;

        let snapshot = decode_snapshot(&content, Some(&self.path))?;
        debug!(variables = snapshot.len(), "Decoded configuration source");

        self.store.replace(snapshot.clone());
        Ok(snapshot)
    }

    /// Starts monitoring the file and reloads the store whenever it changes.
    ///
    /// Bursts of file events are debounced before a reload. Reload failures
    /// are logged and the previous snapshot stays active. The returned task
    /// ends when `cancel` fires.
    ///
    /// # Errors
    /// Returns error if file watching cannot be initialized.
    pub fn watch(&self, cancel: CancellationToken) -> Result<JoinHandle<()>, ConfigError> {
        let (watcher, mut event_rx) = FileWatcher::watch(&self.path)?;
        let source = self.clone();

        info!(path = %watcher.target().display(), "Watching configuration source");

        Ok(tokio::spawn(async move {
            let _watcher = watcher;
            let mut pending = false;

            let debounce_sleep = tokio::time::sleep(RELOAD_DEBOUNCE);
            tokio::pin!(debounce_sleep);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("Configuration source watch cancelled");
                        return;
                    }

                    event = event_rx.recv() => {
                        let Some(event) = event else {
                            warn!("File watcher channel closed");
                            return;
                        };

                        debug!(kind = ?event.kind, "Configuration source event");
                        pending = true;
                        debounce_sleep.as_mut().reset(tokio::time::Instant::now() + RELOAD_DEBOUNCE);
                    }

                    _ = &mut debounce_sleep, if pending => {
                        pending = false;

                        if let Err(e) = source.load().await {
                            error!(error = %e, "Failed to reload configuration source");
                        }
                    }
                }
            }
        }))
    }
}

/// Decodes a TOML document into a snapshot of string variables.
///
/// # Errors
/// Returns `ConfigError::TomlParseError` for malformed TOML and
/// `ConfigError::InvalidValue` for arrays, tables or datetimes.
pub fn decode_snapshot(content: &str, path: Option<&Path>) -> Result<ConfigSnapshot, ConfigError> {
    let table: toml::Table = toml::from_str(content).map_err(|e| ConfigError::TomlParseError {
        location: path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "string".to_string()),
        details: e.to_string(),
    })?;

    let vars = table
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                Value::Integer(i) => i.to_string(),
                Value::Float(f) => format_float(f),
                Value::Boolean(b) => b.to_string(),
                other => {
                    return Err(ConfigError::InvalidValue {
                        key,
                        reason: format!("expected a scalar, found {}", other.type_str()),
                    });
                }
            };
            Ok((key, value))
        })
        .collect::<Result<BTreeMap<_, _>, _>>()?;

    Ok(ConfigSnapshot::new(vars))
}

/// Writes a float the way TOML does: integral values keep `.0`, and the
/// special values are `inf`, `-inf` and `nan`.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        if f.is_sign_negative() { "-inf" } else { "inf" }.to_string()
    } else if f.fract() == 0.0 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}
