//! Interval-driven event production.
//!
//! The [`EventProducer`] renders a [`MessageTemplate`] against the current
//! configuration snapshot on every tick and hands the resulting [`Event`]
//! to an injected [`EventSender`].

mod event;
mod heartbeat;
mod sender;
mod sinks;
mod template;

pub use event::{CONTENT_TYPE_JSON, Event, HeartbeatData, SPEC_VERSION};
pub use heartbeat::{EventProducer, ProducerConfig, ProducerStats};
pub use sender::{EventSender, SendError, SendResult};
pub use sinks::{FileSender, LogSender, StdoutSender, sender_for};
pub use template::{MessageTemplate, RenderError};
