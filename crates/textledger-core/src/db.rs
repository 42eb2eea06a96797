//! Shared `SQLite` pool construction and schema initialization.
//!
//! Every repository in this crate runs against the same database file, so the
//! schema lives here and the repository constructors funnel through
//! [`connect`]. A pool obtained from [`connect`] or [`connect_in_memory`] can
//! be cloned and handed to each repository's `with_pool` constructor.

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::Result;

/// Open (or create) the database at the given path and initialize the schema.
///
/// # Errors
///
/// Returns an error if the database connection fails or schema creation fails.
pub async fn connect(database_path: &str) -> Result<SqlitePool> {
    let url = format!("sqlite:{database_path}?mode=rwc");
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    initialize(&pool).await?;
    Ok(pool)
}

/// Open an in-memory database for testing.
///
/// # Errors
///
/// Returns an error if the database connection fails or schema creation fails.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    initialize(&pool).await?;
    Ok(pool)
}

/// Create all tables and indexes if they don't exist.
async fn initialize(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS conversations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            address TEXT NOT NULL UNIQUE,
            archived INTEGER NOT NULL DEFAULT 0,
            blocked INTEGER NOT NULL DEFAULT 0,
            blocking_backend INTEGER,
            block_reason TEXT,
            snippet TEXT,
            last_message_at INTEGER,
            unread_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            thread_id INTEGER NOT NULL REFERENCES conversations(id),
            sub_id INTEGER NOT NULL,
            address TEXT NOT NULL,
            body TEXT NOT NULL,
            date INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'received',
            result_code INTEGER,
            read INTEGER NOT NULL DEFAULT 0
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE INDEX IF NOT EXISTS idx_messages_thread ON messages(thread_id, date)
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS blocked_numbers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            address TEXT NOT NULL UNIQUE,
            reason TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS scheduled_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            send_at TEXT NOT NULL,
            sub_id INTEGER NOT NULL,
            recipients TEXT NOT NULL,
            send_as_group INTEGER NOT NULL DEFAULT 1,
            body TEXT NOT NULL,
            attachments TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE INDEX IF NOT EXISTS idx_scheduled_send_at ON scheduled_messages(send_at)
        ",
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let pool = connect_in_memory().await.unwrap();
        initialize(&pool).await.unwrap();
        initialize(&pool).await.unwrap();
    }
}
