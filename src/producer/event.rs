use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// CloudEvents spec version stamped on every event.
pub const SPEC_VERSION: &str = "1.0";

/// Content type of the event payload.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Payload carried by every heartbeat event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeartbeatData {
    /// Position of this event in the producer's stream, starting at 0.
    pub sequence: u64,
    /// The configured interval, formatted like `"5s"` or `"100ms"`.
    pub heartbeat: String,
    /// Rendered message; empty when rendering failed.
    pub message: String,
}

/// An immutable event in a CloudEvents-shaped envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Envelope version.
    pub specversion: String,
    /// Unique identifier of this event.
    pub id: String,
    /// Event type identifier.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Identifier of the producing source.
    pub source: String,
    /// Time the event was constructed.
    pub time: DateTime<Utc>,
    /// Content type of `data`.
    pub datacontenttype: String,
    /// Heartbeat payload.
    pub data: HeartbeatData,
}

impl Event {
    /// Builds a new event with a fresh id and the current time.
    pub fn new(event_type: &str, source: &str, data: HeartbeatData) -> Self {
        Self {
            specversion: SPEC_VERSION.to_string(),
            id: Uuid::new_v4().to_string(),
            event_type: event_type.to_string(),
            source: source.to_string(),
            time: Utc::now(),
            datacontenttype: CONTENT_TYPE_JSON.to_string(),
            data,
        }
    }

    /// Sequence number of the payload.
    pub fn sequence(&self) -> u64 {
        self.data.sequence
    }

    /// Serializes the whole envelope as a single-line JSON document.
    ///
    /// # Errors
    /// Returns the serializer error, which only occurs for non-string map keys
    /// and cannot happen for this type in practice.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
