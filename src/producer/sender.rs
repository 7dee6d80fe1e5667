use std::time::Duration;

use async_trait::async_trait;

use super::Event;

/// Reason a delivery attempt was not acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// The receiver answered but refused the event
    #[error("event rejected by receiver: {0}")]
    Rejected(String),

    /// The attempt did not complete within the send timeout
    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),

    /// The transport failed before the receiver answered
    #[error("transport error: {0}")]
    Transport(String),

    /// The event could not be encoded for the transport
    #[error("failed to encode event: {0}")]
    Encoding(String),
}

/// Outcome of a delivery attempt: `Ok` means acknowledged.
pub type SendResult = Result<(), SendError>;

/// Capability to deliver events to a downstream receiver.
///
/// The producer treats every `Err` as transient: it logs it and moves on to
/// the next tick without retrying.
#[async_trait]
pub trait EventSender: Send + Sync {
    /// Attempts to deliver one event.
    async fn send(&self, event: &Event) -> SendResult;
}
