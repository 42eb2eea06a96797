//! Message storage: the persisted SMS entity and its store port.

mod model;
mod repository;

use async_trait::async_trait;

use crate::Result;
use crate::conversation::ThreadId;

pub use model::{DeliveryStatus, Message, MessageId};
pub use repository::MessageRepository;

/// Port for message persistence.
///
/// The intake pipeline only talks to this trait; [`MessageRepository`] is the
/// bundled `SQLite` implementation.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a received SMS and return it bound to its (possibly newly
    /// created) conversation thread.
    async fn insert_received_sms(
        &self,
        sub_id: i32,
        address: &str,
        body: &str,
        date: i64,
    ) -> Result<Message>;

    /// Mark every message in a thread as read. Idempotent.
    async fn mark_read(&self, thread_id: ThreadId) -> Result<()>;

    /// Mark a message as failed with the platform result code. Idempotent.
    async fn mark_failed(&self, message_id: MessageId, result_code: i32) -> Result<()>;
}
