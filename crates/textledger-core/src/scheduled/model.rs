//! Scheduled message model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message queued to be sent at a later instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledMessage {
    /// Unique identifier, `None` until persisted.
    pub id: Option<i64>,
    /// When the message should be sent.
    pub send_at: DateTime<Utc>,
    /// Carrier subscription to send from.
    pub sub_id: i32,
    /// Recipient addresses.
    pub recipients: Vec<String>,
    /// Whether multiple recipients receive one group message or individual
    /// copies.
    pub send_as_group: bool,
    /// Message body text.
    pub body: String,
    /// Attachment URIs.
    pub attachments: Vec<String>,
}

impl ScheduledMessage {
    /// Create a new unpersisted scheduled message.
    #[must_use]
    pub fn new(send_at: DateTime<Utc>, sub_id: i32, recipients: Vec<String>, body: &str) -> Self {
        Self {
            id: None,
            send_at,
            sub_id,
            recipients,
            send_as_group: true,
            body: body.to_string(),
            attachments: Vec::new(),
        }
    }
}
