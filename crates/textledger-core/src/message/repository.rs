//! `SQLite`-backed message repository.

use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use tracing::debug;

use super::model::{DeliveryStatus, Message, MessageId};
use super::MessageStore;
use crate::address::normalize_address;
use crate::conversation::ThreadId;
use crate::{Result, db};

/// Repository for message storage.
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
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

    /// Fetch a message by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn message(&self, id: MessageId) -> Result<Option<Message>> {
        let row = sqlx::query(
            r"
            SELECT id, thread_id, sub_id, address, body, date, status, result_code, read
            FROM messages
            WHERE id = ?
            ",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| row_to_message(&r)))
    }

    /// Fetch every message in a thread, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn messages_for_thread(&self, thread_id: ThreadId) -> Result<Vec<Message>> {
        let rows = sqlx::query(
            r"
            SELECT id, thread_id, sub_id, address, body, date, status, result_code, read
            FROM messages
            WHERE thread_id = ?
            ORDER BY date ASC, id ASC
            ",
        )
        .bind(thread_id.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_message).collect())
    }

    /// Resolve the conversation thread for an address, allocating the
    /// conversation row on first contact.
    async fn resolve_thread(&self, address: &str) -> Result<ThreadId> {
        sqlx::query(
            r"
            INSERT INTO conversations (address) VALUES (?)
            ON CONFLICT(address) DO NOTHING
            ",
        )
        .bind(address)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(
            r"
            SELECT id FROM conversations WHERE address = ?
            ",
        )
        .bind(address)
        .fetch_one(&self.pool)
        .await?;

        Ok(ThreadId(row.get("id")))
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn insert_received_sms(
        &self,
        sub_id: i32,
        address: &str,
        body: &str,
        date: i64,
    ) -> Result<Message> {
        let address = normalize_address(address);
        let thread_id = self.resolve_thread(&address).await?;

        let result = sqlx::query(
            r"
            INSERT INTO messages (thread_id, sub_id, address, body, date, status, read)
            VALUES (?, ?, ?, ?, ?, 'received', 0)
            ",
        )
        .bind(thread_id.0)
        .bind(sub_id)
        .bind(&address)
        .bind(body)
        .bind(date)
        .execute(&self.pool)
        .await?;

        let id = MessageId(result.last_insert_rowid());
        debug!(message = %id, thread = %thread_id, "stored received sms");

        Ok(Message {
            id,
            thread_id,
            sub_id,
            address,
            body: body.to_string(),
            date,
            status: DeliveryStatus::Received,
            result_code: None,
            read: false,
        })
    }

    async fn mark_read(&self, thread_id: ThreadId) -> Result<()> {
        sqlx::query(
            r"
            UPDATE messages SET read = 1 WHERE thread_id = ? AND read = 0
            ",
        )
        .bind(thread_id.0)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_failed(&self, message_id: MessageId, result_code: i32) -> Result<()> {
        sqlx::query(
            r"
            UPDATE messages SET status = 'failed', result_code = ? WHERE id = ?
            ",
        )
        .bind(result_code)
        .bind(message_id.0)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Convert a database row to a [`Message`].
fn row_to_message(row: &SqliteRow) -> Message {
    Message {
        id: MessageId(row.get("id")),
        thread_id: ThreadId(row.get("thread_id")),
        sub_id: row.get("sub_id"),
        address: row.get("address"),
        body: row.get("body"),
        date: row.get("date"),
        status: DeliveryStatus::parse(row.get("status")),
        result_code: row.get("result_code"),
        read: row.get("read"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_allocates_thread_per_address() {
        let repo = MessageRepository::in_memory().await.unwrap();

        let first = repo
            .insert_received_sms(1, "+1 555 010 2030", "hello", 1000)
            .await
            .unwrap();
        let second = repo
            .insert_received_sms(1, "+1-555-010-2030", "again", 2000)
            .await
            .unwrap();
        let other = repo
            .insert_received_sms(1, "+15550109999", "elsewhere", 3000)
            .await
            .unwrap();

        assert_eq!(first.thread_id, second.thread_id);
        assert_ne!(first.thread_id, other.thread_id);
        assert_eq!(first.address, "+15550102030");
    }

    #[tokio::test]
    async fn test_insert_preserves_body_and_date() {
        let repo = MessageRepository::in_memory().await.unwrap();

        let message = repo
            .insert_received_sms(2, "5550102030", "body text", 1234)
            .await
            .unwrap();

        let stored = repo.message(message.id).await.unwrap().unwrap();
        assert_eq!(stored.sub_id, 2);
        assert_eq!(stored.body, "body text");
        assert_eq!(stored.date, 1234);
        assert_eq!(stored.status, DeliveryStatus::Received);
        assert!(!stored.read);
    }

    #[tokio::test]
    async fn test_mark_read_covers_whole_thread() {
        let repo = MessageRepository::in_memory().await.unwrap();

        let first = repo
            .insert_received_sms(1, "5550102030", "one", 1000)
            .await
            .unwrap();
        repo.insert_received_sms(1, "5550102030", "two", 2000)
            .await
            .unwrap();

        repo.mark_read(first.thread_id).await.unwrap();
        // Second call is a no-op.
        repo.mark_read(first.thread_id).await.unwrap();

        let messages = repo.messages_for_thread(first.thread_id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m.read));
    }

    #[tokio::test]
    async fn test_mark_failed_records_result_code() {
        let repo = MessageRepository::in_memory().await.unwrap();

        let message = repo
            .insert_received_sms(1, "5550102030", "doomed", 1000)
            .await
            .unwrap();
        repo.mark_failed(message.id, 133).await.unwrap();

        let stored = repo.message(message.id).await.unwrap().unwrap();
        assert_eq!(stored.status, DeliveryStatus::Failed);
        assert_eq!(stored.result_code, Some(133));
    }

    #[tokio::test]
    async fn test_messages_for_thread_ordered_by_date() {
        let repo = MessageRepository::in_memory().await.unwrap();

        repo.insert_received_sms(1, "5550102030", "late", 3000)
            .await
            .unwrap();
        let message = repo
            .insert_received_sms(1, "5550102030", "early", 1000)
            .await
            .unwrap();

        let messages = repo.messages_for_thread(message.thread_id).await.unwrap();
        assert_eq!(messages[0].body, "early");
        assert_eq!(messages[1].body, "late");
    }
}
