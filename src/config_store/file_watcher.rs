use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher, recommended_watcher};
use tokio::sync::mpsc;

use super::ConfigError;

/// Represents a file system event for the watched file.
#[derive(Debug, Clone)]
pub struct FileEvent {
    /// The path of the file that changed
    pub path: PathBuf,
    /// The type of change that occurred
    pub kind: FileEventKind,
}

/// The type of file system change that occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum FileEventKind {
    /// File was modified
    Modified,
    /// File was created
    Created,
    /// File was removed
    Removed,
}

/// Watches a single file through its parent directory.
///
/// Editors commonly save by writing a temporary file and renaming it over
/// the original, which drops a watch placed on the file itself. Watching the
/// directory and filtering by file name survives that pattern.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    target: PathBuf,
}

impl FileWatcher {
    /// Starts watching `path` and returns the watcher with its event receiver.
    ///
    /// Uses an unbounded channel since file events are infrequent but bursty.
    /// The watch stops when the returned watcher is dropped.
    ///
    /// # Errors
    /// Returns `ConfigError::FileWatcherInitError` if the platform watcher
    /// cannot be created, or `ConfigError::FileWatchError` if the parent
    /// directory cannot be watched.
    pub fn watch(
        path: impl AsRef<Path>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<FileEvent>), ConfigError> {
        let target = absolute(path.as_ref());
        let directory = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let file_name = target.file_name().map(|name| name.to_os_string());

        let mut watcher = recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else {
                return;
            };

            let kind = match event.kind {
                EventKind::Create(_) => FileEventKind::Created,
                EventKind::Modify(_) => FileEventKind::Modified,
                EventKind::Remove(_) => FileEventKind::Removed,
                _ => return,
            };

            for path in event.paths {
                if path.file_name().map(|name| name.to_os_string()) != file_name {
                    continue;
                }

                let _ = event_tx.send(FileEvent {
                    path,
                    kind: kind.clone(),
                });
            }
        })
        .map_err(|e| ConfigError::FileWatcherInitError {
            details: e.to_string(),
        })?;

        watcher
            .watch(&directory, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::FileWatchError {
                path: directory.clone(),
                details: e.to_string(),
            })?;

        Ok((
            Self {
                _watcher: watcher,
                target,
            },
            event_rx,
        ))
    }

    /// The file this watcher reports on.
    pub fn target(&self) -> &Path {
        &self.target
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
