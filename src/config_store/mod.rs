//! Hot-reloadable store of named configuration variables.
//!
//! Holds the current variables as an immutable snapshot that is replaced
//! wholesale, notifies registered observers after each replacement, and
//! can be fed from a watched TOML file.

mod changes;
mod diff;
mod file_watcher;
mod snapshot;
mod source;
mod store;

#[cfg(test)]
mod tests;

pub use changes::{ConfigChange, ConfigError};
pub use diff::diff_snapshots;
pub use file_watcher::{FileEvent, FileEventKind, FileWatcher};
pub use snapshot::ConfigSnapshot;
pub use source::{ConfigSource, decode_snapshot};
pub use store::{ConfigStore, DEFAULT_STORE_NAME, ReplaceCallback};
