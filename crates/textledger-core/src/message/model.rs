//! Message model types.

use crate::conversation::ThreadId;

/// Unique identifier for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub i64);

impl MessageId {
    /// Create a new message ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Delivery state of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryStatus {
    /// Received from the network.
    #[default]
    Received,
    /// Queued or in flight.
    Sending,
    /// Accepted by the network for delivery.
    Sent,
    /// Delivery failed; `result_code` carries the platform error.
    Failed,
}

impl DeliveryStatus {
    /// Parse from database string representation.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "sending" => Self::Sending,
            "sent" => Self::Sent,
            "failed" => Self::Failed,
            _ => Self::Received,
        }
    }

    /// Convert to database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Sending => "sending",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

/// One logical SMS, persisted and bound to its conversation thread.
#[derive(Debug, Clone)]
pub struct Message {
    /// Unique identifier.
    pub id: MessageId,
    /// Conversation thread this message belongs to.
    pub thread_id: ThreadId,
    /// Carrier subscription that received or sends the message.
    pub sub_id: i32,
    /// Normalized sender (or recipient) address.
    pub address: String,
    /// Message body text.
    pub body: String,
    /// Timestamp in milliseconds since the epoch.
    pub date: i64,
    /// Delivery state.
    pub status: DeliveryStatus,
    /// Platform result code for failed messages.
    pub result_code: Option<i32>,
    /// Whether the message has been read.
    pub read: bool,
}
