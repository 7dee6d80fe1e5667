use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio::{
    fs::OpenOptions,
    io::{AsyncWriteExt, Stdout},
    sync::Mutex,
};
use tracing::info;

use super::{Event, EventSender, SendError, SendResult};
use crate::config::SinkConfig;

/// Emits every event as a structured log record and always acknowledges.
#[derive(Debug, Default, Clone)]
pub struct LogSender;

#[async_trait]
impl EventSender for LogSender {
    async fn send(&self, event: &Event) -> SendResult {
        info!(
            id = %event.id,
            event_type = %event.event_type,
            source = %event.source,
            sequence = event.data.sequence,
            heartbeat = %event.data.heartbeat,
            message = %event.data.message,
            "Heartbeat event"
        );
        Ok(())
    }
}

/// Writes every event as one JSON line on standard output.
pub struct StdoutSender {
    stdout: Mutex<Stdout>,
}

impl StdoutSender {
    /// Creates a sender writing to the process's standard output.
    pub fn new() -> Self {
        Self {
            stdout: Mutex::new(tokio::io::stdout()),
        }
    }
}

impl Default for StdoutSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSender for StdoutSender {
    async fn send(&self, event: &Event) -> SendResult {
        let line = encode_line(event)?;
        let mut stdout = self.stdout.lock().await;

        stdout
            .write_all(line.as_bytes())
            .await
            .map_err(|e| SendError::Transport(e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| SendError::Transport(e.to_string()))
    }
}

/// Appends every event as one JSON line to a file.
///
/// The file is opened per event so that rotation by external tools is
/// picked up without a restart.
pub struct FileSender {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSender {
    /// Creates a sender appending to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl EventSender for FileSender {
    async fn send(&self, event: &Event) -> SendResult {
        let line = encode_line(event)?;
        let _guard = self.write_lock.lock().await;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| SendError::Transport(format!("{}: {e}", self.path.display())))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| SendError::Transport(format!("{}: {e}", self.path.display())))?;
        file.flush()
            .await
            .map_err(|e| SendError::Transport(format!("{}: {e}", self.path.display())))
    }
}

fn encode_line(event: &Event) -> Result<String, SendError> {
    let mut line = event
        .to_json()
        .map_err(|e| SendError::Encoding(e.to_string()))?;
    line.push('\n');
    Ok(line)
}

/// Builds the sender described by `sink`.
pub fn sender_for(sink: &SinkConfig) -> Arc<dyn EventSender> {
    match sink {
        SinkConfig::Log => Arc::new(LogSender),
        SinkConfig::Stdout => Arc::new(StdoutSender::new()),
        SinkConfig::File { path } => Arc::new(FileSender::new(path.clone())),
    }
}
