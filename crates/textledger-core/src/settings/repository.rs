//! `SQLite`-backed key/value settings.

use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::SqlitePool;

use super::Settings;
use crate::blocking::INTERNAL_BACKEND;
use crate::{Result, db};

/// Setting key for the drop-blocked-senders flag.
pub const DROP_BLOCKED: &str = "drop_blocked";

/// Setting key for the active blocking backend identifier.
pub const BLOCKING_BACKEND: &str = "blocking_backend";

/// Repository for persisted settings.
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
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

    /// Fetch a raw setting value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query(
            r"
            SELECT value FROM settings WHERE key = ?
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.get("value")))
    }

    /// Store a setting value, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO settings (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            ",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Enable or disable silently dropping messages from blocked senders.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn set_drop_blocked(&self, value: bool) -> Result<()> {
        self.set(DROP_BLOCKED, if value { "true" } else { "false" })
            .await
    }

    /// Select the active blocking backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn set_blocking_backend(&self, backend: i64) -> Result<()> {
        self.set(BLOCKING_BACKEND, &backend.to_string()).await
    }
}

#[async_trait]
impl Settings for SettingsRepository {
    async fn drop_blocked(&self) -> Result<bool> {
        Ok(self
            .get(DROP_BLOCKED)
            .await?
            .is_some_and(|value| value == "true"))
    }

    async fn blocking_backend(&self) -> Result<i64> {
        Ok(self
            .get(BLOCKING_BACKEND)
            .await?
            .and_then(|value| value.parse().ok())
            .unwrap_or(INTERNAL_BACKEND))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drop_blocked_defaults_false() {
        let repo = SettingsRepository::in_memory().await.unwrap();
        assert!(!repo.drop_blocked().await.unwrap());
    }

    #[tokio::test]
    async fn test_set_drop_blocked_roundtrip() {
        let repo = SettingsRepository::in_memory().await.unwrap();

        repo.set_drop_blocked(true).await.unwrap();
        assert!(repo.drop_blocked().await.unwrap());

        repo.set_drop_blocked(false).await.unwrap();
        assert!(!repo.drop_blocked().await.unwrap());
    }

    #[tokio::test]
    async fn test_blocking_backend_defaults_internal() {
        let repo = SettingsRepository::in_memory().await.unwrap();
        assert_eq!(repo.blocking_backend().await.unwrap(), INTERNAL_BACKEND);
    }

    #[tokio::test]
    async fn test_set_blocking_backend() {
        let repo = SettingsRepository::in_memory().await.unwrap();

        repo.set_blocking_backend(2).await.unwrap();
        assert_eq!(repo.blocking_backend().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unparseable_backend_falls_back_to_internal() {
        let repo = SettingsRepository::in_memory().await.unwrap();

        repo.set(BLOCKING_BACKEND, "not a number").await.unwrap();
        assert_eq!(repo.blocking_backend().await.unwrap(), INTERNAL_BACKEND);
    }
}
