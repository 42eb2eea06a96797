//! Scheduled message storage repository.

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};

use super::model::ScheduledMessage;
use crate::{Error, Result, db};

/// Repository for the scheduled-message queue.
pub struct ScheduledMessageRepository {
    pool: SqlitePool,
}

impl ScheduledMessageRepository {
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

    /// Persist a scheduled message and return its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or the recipient list
    /// cannot be encoded.
    pub async fn save(&self, message: &ScheduledMessage) -> Result<i64> {
        let recipients = serde_json::to_string(&message.recipients)?;
        let attachments = serde_json::to_string(&message.attachments)?;

        let result = sqlx::query(
            r"
            INSERT INTO scheduled_messages
                (send_at, sub_id, recipients, send_as_group, body, attachments)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(message.send_at.to_rfc3339())
        .bind(message.sub_id)
        .bind(&recipients)
        .bind(message.send_as_group)
        .bind(&message.body)
        .bind(&attachments)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Every scheduled message due at or before `now`, earliest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn due(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledMessage>> {
        let rows = sqlx::query(
            r"
            SELECT id, send_at, sub_id, recipients, send_as_group, body, attachments
            FROM scheduled_messages
            WHERE send_at <= ?
            ORDER BY send_at ASC
            ",
        )
        .bind(now.to_rfc3339())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_scheduled).collect()
    }

    /// Every scheduled message, earliest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<ScheduledMessage>> {
        let rows = sqlx::query(
            r"
            SELECT id, send_at, sub_id, recipients, send_as_group, body, attachments
            FROM scheduled_messages
            ORDER BY send_at ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_scheduled).collect()
    }

    /// Remove a scheduled message (after it was sent or cancelled).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query(
            r"
            DELETE FROM scheduled_messages WHERE id = ?
            ",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Convert a database row to a [`ScheduledMessage`].
fn row_to_scheduled(row: &SqliteRow) -> Result<ScheduledMessage> {
    let send_at: String = row.get("send_at");
    let send_at = DateTime::parse_from_rfc3339(&send_at)
        .map_err(|e| Error::Config(format!("bad send_at timestamp: {e}")))?
        .with_timezone(&Utc);

    let recipients: String = row.get("recipients");
    let attachments: String = row.get("attachments");

    Ok(ScheduledMessage {
        id: Some(row.get("id")),
        send_at,
        sub_id: row.get("sub_id"),
        recipients: serde_json::from_str(&recipients)?,
        send_as_group: row.get("send_as_group"),
        body: row.get("body"),
        attachments: serde_json::from_str(&attachments)?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    #[tokio::test]
    async fn test_save_and_list_roundtrip() {
        let repo = ScheduledMessageRepository::in_memory().await.unwrap();

        let mut message = ScheduledMessage::new(
            at(1_700_000_000),
            1,
            vec!["5550102030".to_string(), "5550104050".to_string()],
            "see you then",
        );
        message.send_as_group = false;
        message.attachments = vec!["file:///tmp/map.png".to_string()];

        let id = repo.save(&message).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, Some(id));
        assert_eq!(listed[0].send_at, at(1_700_000_000));
        assert_eq!(listed[0].recipients.len(), 2);
        assert!(!listed[0].send_as_group);
        assert_eq!(listed[0].attachments[0], "file:///tmp/map.png");
    }

    #[tokio::test]
    async fn test_due_returns_only_elapsed() {
        let repo = ScheduledMessageRepository::in_memory().await.unwrap();

        repo.save(&ScheduledMessage::new(
            at(1000),
            1,
            vec!["5550102030".to_string()],
            "past",
        ))
        .await
        .unwrap();
        repo.save(&ScheduledMessage::new(
            at(3000),
            1,
            vec!["5550102030".to_string()],
            "future",
        ))
        .await
        .unwrap();

        let due = repo.due(at(2000)).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].body, "past");
    }

    #[tokio::test]
    async fn test_delete_removes_entry() {
        let repo = ScheduledMessageRepository::in_memory().await.unwrap();

        let id = repo
            .save(&ScheduledMessage::new(
                at(1000),
                1,
                vec!["5550102030".to_string()],
                "bye",
            ))
            .await
            .unwrap();
        repo.delete(id).await.unwrap();

        assert!(repo.list().await.unwrap().is_empty());
    }
}
