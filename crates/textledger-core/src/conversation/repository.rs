//! `SQLite`-backed conversation repository.

use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use tracing::debug;

use super::ConversationStore;
use super::model::{Conversation, ThreadId};
use crate::address::normalize_address;
use crate::{Result, db};

/// Repository for conversation state.
pub struct ConversationRepository {
    pool: SqlitePool,
}

impl ConversationRepository {
    /// Create a new repository with the given database path.
    ///
    /// Creates the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        Ok(Self {
            pool: db::connect(database_path).await?,
        })
    }

    /// Create an in-memory repository for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        Ok(Self {
            pool: db::connect_in_memory().await?,
        })
    }

    /// Wrap a pool obtained from [`db::connect`], sharing it with other
    /// repositories.
    #[must_use]
    pub const fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List every conversation, most recently active first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn conversations(&self) -> Result<Vec<Conversation>> {
        let rows = sqlx::query(
            r"
            SELECT id, address, archived, blocked, blocking_backend, block_reason,
                   snippet, last_message_at, unread_count
            FROM conversations
            ORDER BY last_message_at IS NULL, last_message_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_conversation).collect())
    }

    /// Fetch the conversation for an address, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn conversation_by_address(&self, address: &str) -> Result<Option<Conversation>> {
        let normalized = normalize_address(address);

        let row = sqlx::query(
            r"
            SELECT id, address, archived, blocked, blocking_backend, block_reason,
                   snippet, last_message_at, unread_count
            FROM conversations
            WHERE address = ?
            ",
        )
        .bind(&normalized)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| row_to_conversation(&r)))
    }

    /// Flag a thread as archived.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn mark_archived(&self, thread_id: ThreadId) -> Result<()> {
        sqlx::query(
            r"
            UPDATE conversations
            SET archived = 1, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            ",
        )
        .bind(thread_id.0)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Total unread messages across all non-blocked, non-archived threads.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn total_unread(&self) -> Result<u64> {
        let row = sqlx::query(
            r"
            SELECT COALESCE(SUM(unread_count), 0) AS unread
            FROM conversations
            WHERE blocked = 0 AND archived = 0
            ",
        )
        .fetch_one(&self.pool)
        .await?;

        #[allow(clippy::cast_sign_loss)]
        Ok(row.get::<i64, _>("unread") as u64)
    }
}

#[async_trait]
impl ConversationStore for ConversationRepository {
    async fn mark_blocked(
        &self,
        thread_ids: &[ThreadId],
        backend: i64,
        reason: Option<&str>,
    ) -> Result<()> {
        for thread_id in thread_ids {
            sqlx::query(
                r"
                UPDATE conversations
                SET blocked = 1,
                    blocking_backend = ?,
                    block_reason = ?,
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = ?
                ",
            )
            .bind(backend)
            .bind(reason)
            .bind(thread_id.0)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    async fn mark_unblocked(&self, thread_id: ThreadId) -> Result<()> {
        sqlx::query(
            r"
            UPDATE conversations
            SET blocked = 0,
                blocking_backend = NULL,
                block_reason = NULL,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            ",
        )
        .bind(thread_id.0)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_unarchived(&self, thread_id: ThreadId) -> Result<()> {
        sqlx::query(
            r"
            UPDATE conversations
            SET archived = 0, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            ",
        )
        .bind(thread_id.0)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_conversations(&self, thread_id: ThreadId) -> Result<()> {
        sqlx::query(
            r"
            UPDATE conversations
            SET snippet = (
                    SELECT substr(body, 1, 120) FROM messages
                    WHERE thread_id = ?1
                    ORDER BY date DESC, id DESC LIMIT 1
                ),
                last_message_at = (
                    SELECT MAX(date) FROM messages WHERE thread_id = ?1
                ),
                unread_count = (
                    SELECT COUNT(*) FROM messages WHERE thread_id = ?1 AND read = 0
                ),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?1
            ",
        )
        .bind(thread_id.0)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_or_create_conversation(&self, thread_id: ThreadId) -> Result<Option<Conversation>> {
        let row = sqlx::query(
            r"
            SELECT id, address, archived, blocked, blocking_backend, block_reason,
                   snippet, last_message_at, unread_count
            FROM conversations
            WHERE id = ?
            ",
        )
        .bind(thread_id.0)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(Some(row_to_conversation(&row)));
        }

        // The messages table may still know the thread even if its
        // conversation row was lost; rebuild the row from the latest message.
        let latest = sqlx::query(
            r"
            SELECT address FROM messages
            WHERE thread_id = ?
            ORDER BY date DESC, id DESC LIMIT 1
            ",
        )
        .bind(thread_id.0)
        .fetch_optional(&self.pool)
        .await?;

        let Some(latest) = latest else {
            return Ok(None);
        };

        debug!(thread = %thread_id, "rebuilding lost conversation row");
        sqlx::query(
            r"
            INSERT INTO conversations (id, address) VALUES (?, ?)
            ON CONFLICT(id) DO NOTHING
            ",
        )
        .bind(thread_id.0)
        .bind(latest.get::<String, _>("address"))
        .execute(&self.pool)
        .await?;
        self.update_conversations(thread_id).await?;

        let row = sqlx::query(
            r"
            SELECT id, address, archived, blocked, blocking_backend, block_reason,
                   snippet, last_message_at, unread_count
            FROM conversations
            WHERE id = ?
            ",
        )
        .bind(thread_id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| row_to_conversation(&r)))
    }
}

/// Convert a database row to a [`Conversation`].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn row_to_conversation(row: &SqliteRow) -> Conversation {
    Conversation {
        id: ThreadId(row.get("id")),
        address: row.get("address"),
        archived: row.get("archived"),
        blocked: row.get("blocked"),
        blocking_backend: row.get("blocking_backend"),
        block_reason: row.get("block_reason"),
        snippet: row.get("snippet"),
        last_message_at: row.get("last_message_at"),
        unread_count: row.get::<i64, _>("unread_count") as u32,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::message::{MessageRepository, MessageStore};

    async fn shared_repos() -> (MessageRepository, ConversationRepository) {
        let pool = db::connect_in_memory().await.unwrap();
        (
            MessageRepository::with_pool(pool.clone()),
            ConversationRepository::with_pool(pool),
        )
    }

    #[tokio::test]
    async fn test_block_then_unblock_roundtrip() {
        let (messages, conversations) = shared_repos().await;
        let message = messages
            .insert_received_sms(1, "5550102030", "hi", 1000)
            .await
            .unwrap();

        conversations
            .mark_blocked(&[message.thread_id], 0, Some("spam"))
            .await
            .unwrap();
        let blocked = conversations
            .get_or_create_conversation(message.thread_id)
            .await
            .unwrap()
            .unwrap();
        assert!(blocked.blocked);
        assert_eq!(blocked.blocking_backend, Some(0));
        assert_eq!(blocked.block_reason, Some("spam".to_string()));

        conversations
            .mark_unblocked(message.thread_id)
            .await
            .unwrap();
        let unblocked = conversations
            .get_or_create_conversation(message.thread_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!unblocked.blocked);
        assert_eq!(unblocked.blocking_backend, None);
        assert_eq!(unblocked.block_reason, None);
    }

    #[tokio::test]
    async fn test_update_conversations_recomputes_derived_state() {
        let (messages, conversations) = shared_repos().await;
        let first = messages
            .insert_received_sms(1, "5550102030", "first", 1000)
            .await
            .unwrap();
        messages
            .insert_received_sms(1, "5550102030", "second", 2000)
            .await
            .unwrap();

        conversations
            .update_conversations(first.thread_id)
            .await
            .unwrap();

        let conversation = conversations
            .get_or_create_conversation(first.thread_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conversation.snippet, Some("second".to_string()));
        assert_eq!(conversation.last_message_at, Some(2000));
        assert_eq!(conversation.unread_count, 2);

        messages.mark_read(first.thread_id).await.unwrap();
        conversations
            .update_conversations(first.thread_id)
            .await
            .unwrap();
        let conversation = conversations
            .get_or_create_conversation(first.thread_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conversation.unread_count, 0);
    }

    #[tokio::test]
    async fn test_archive_roundtrip() {
        let (messages, conversations) = shared_repos().await;
        let message = messages
            .insert_received_sms(1, "5550102030", "hi", 1000)
            .await
            .unwrap();

        conversations.mark_archived(message.thread_id).await.unwrap();
        let archived = conversations
            .get_or_create_conversation(message.thread_id)
            .await
            .unwrap()
            .unwrap();
        assert!(archived.archived);

        conversations
            .mark_unarchived(message.thread_id)
            .await
            .unwrap();
        let active = conversations
            .get_or_create_conversation(message.thread_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!active.archived);
    }

    #[tokio::test]
    async fn test_get_or_create_unknown_thread_is_none() {
        let (_messages, conversations) = shared_repos().await;

        let missing = conversations
            .get_or_create_conversation(ThreadId(999))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_get_or_create_rebuilds_lost_row() {
        let (messages, conversations) = shared_repos().await;
        let message = messages
            .insert_received_sms(1, "5550102030", "hi", 1000)
            .await
            .unwrap();

        // Simulate a lost conversation row.
        sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(message.thread_id.0)
            .execute(&conversations.pool)
            .await
            .unwrap();

        let rebuilt = conversations
            .get_or_create_conversation(message.thread_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rebuilt.id, message.thread_id);
        assert_eq!(rebuilt.address, "5550102030");
        assert_eq!(rebuilt.snippet, Some("hi".to_string()));
    }

    #[tokio::test]
    async fn test_total_unread_skips_blocked_and_archived() {
        let (messages, conversations) = shared_repos().await;

        let active = messages
            .insert_received_sms(1, "5550100001", "a", 1000)
            .await
            .unwrap();
        let blocked = messages
            .insert_received_sms(1, "5550100002", "b", 1000)
            .await
            .unwrap();

        conversations
            .update_conversations(active.thread_id)
            .await
            .unwrap();
        conversations
            .update_conversations(blocked.thread_id)
            .await
            .unwrap();
        conversations
            .mark_blocked(&[blocked.thread_id], 0, None)
            .await
            .unwrap();

        assert_eq!(conversations.total_unread().await.unwrap(), 1);
    }
}
