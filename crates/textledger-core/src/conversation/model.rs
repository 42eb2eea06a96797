//! Conversation model types.

/// Unique identifier for a conversation thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadId(pub i64);

impl ThreadId {
    /// Create a new thread ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A conversation thread, keyed one-per-address.
#[derive(Debug, Clone)]
pub struct Conversation {
    /// Unique identifier.
    pub id: ThreadId,
    /// Normalized address of the other participant.
    pub address: String,
    /// Whether the thread is hidden from the active list.
    pub archived: bool,
    /// Whether the sender is blocked. A blocked thread never triggers a
    /// user-facing notification from the intake pipeline.
    pub blocked: bool,
    /// Identifier of the blocking backend that made the block decision.
    pub blocking_backend: Option<i64>,
    /// Reason reported by the blocking backend, if any.
    pub block_reason: Option<String>,
    /// Preview of the latest message.
    pub snippet: Option<String>,
    /// Timestamp of the latest message in milliseconds since the epoch.
    pub last_message_at: Option<i64>,
    /// Number of unread messages in the thread.
    pub unread_count: u32,
}
