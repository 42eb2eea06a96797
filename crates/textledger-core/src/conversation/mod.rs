//! Conversation storage: thread state, flags, and the store port.

mod model;
mod repository;

use async_trait::async_trait;

use crate::Result;

pub use model::{Conversation, ThreadId};
pub use repository::ConversationRepository;

/// Port for conversation state.
///
/// The intake pipeline only talks to this trait; [`ConversationRepository`]
/// is the bundled `SQLite` implementation.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Flag the given threads as blocked, recording the deciding backend and
    /// its reason.
    async fn mark_blocked(
        &self,
        thread_ids: &[ThreadId],
        backend: i64,
        reason: Option<&str>,
    ) -> Result<()>;

    /// Clear the blocked flag (and recorded backend/reason) for a thread.
    async fn mark_unblocked(&self, thread_id: ThreadId) -> Result<()>;

    /// Clear the archived flag for a thread.
    async fn mark_unarchived(&self, thread_id: ThreadId) -> Result<()>;

    /// Recompute a thread's derived state (snippet, last-message timestamp,
    /// unread count) from its messages.
    async fn update_conversations(&self, thread_id: ThreadId) -> Result<()>;

    /// Fetch the conversation for a thread, re-creating a lost conversation
    /// row from the thread's messages where possible.
    ///
    /// Returns `None` only when the thread is genuinely unknown.
    async fn get_or_create_conversation(&self, thread_id: ThreadId) -> Result<Option<Conversation>>;
}
