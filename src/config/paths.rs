use std::{
    env,
    io::{Error, ErrorKind},
    path::PathBuf,
};

/// Utility struct for locating settings and log files
///
/// Follows the XDG Base Directory specification
pub struct ConfigPaths;

impl ConfigPaths {
    /// Returns the configuration directory path for the application
    ///
    /// - First checks `XDG_CONFIG_HOME`
    /// - Falls back to `$HOME/.config`
    /// - Appends "heartbeats" to the base config directory
    ///
    /// # Errors
    /// Returns an error if neither `XDG_CONFIG_HOME` nor `HOME` environment variables are set
    pub fn config_dir() -> Result<PathBuf, Error> {
        let config_home = env::var("XDG_CONFIG_HOME")
            .or_else(|_| env::var("HOME").map(|home| format!("{home}/.config")))
            .map_err(|_| {
                Error::new(
                    ErrorKind::NotFound,
                    "Neither XDG_CONFIG_HOME nor HOME environment variable found",
                )
            })?;

        Ok(PathBuf::from(config_home).join("heartbeats"))
    }

    /// Returns the default settings file, `heartbeats.toml` in the config directory
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined
    pub fn default_settings_file() -> Result<PathBuf, Error> {
        Ok(Self::config_dir()?.join("heartbeats.toml"))
    }

    /// Returns the log directory, creating it if needed
    ///
    /// Uses `XDG_STATE_HOME` when set, otherwise `$HOME/.local/state`.
    ///
    /// # Errors
    /// Returns error if the location cannot be determined or created
    pub fn log_dir() -> Result<PathBuf, Error> {
        let state_home = env::var("XDG_STATE_HOME")
            .or_else(|_| env::var("HOME").map(|home| format!("{home}/.local/state")))
            .map_err(|_| {
                Error::new(
                    ErrorKind::NotFound,
                    "Neither XDG_STATE_HOME nor HOME environment variable found",
                )
            })?;

        let log_dir = PathBuf::from(state_home).join("heartbeats").join("logs");

        if !log_dir.exists() {
            std::fs::create_dir_all(&log_dir)?;
        }

        Ok(log_dir)
    }
}
