//! `SQLite`-backed block list.

use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::SqlitePool;

use super::client::BlockingClient;
use super::model::BlockAction;
use crate::address::normalize_address;
use crate::{Result, db};

/// An entry in the local block list.
#[derive(Debug, Clone)]
pub struct BlockedNumber {
    /// Normalized blocked address.
    pub address: String,
    /// Reason recorded when the address was blocked.
    pub reason: Option<String>,
}

/// Repository for the local block list; the bundled [`BlockingClient`]
/// implementation.
///
/// Addresses on the list answer `Block`; every other address answers
/// `Unblock`, so a conversation blocked earlier is unblocked again once its
/// sender leaves the list. `BlockAction::None` is reserved for external
/// backends with no opinion.
pub struct BlockingRepository {
    pool: SqlitePool,
}

impl BlockingRepository {
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

    /// Add an address to the block list, updating the reason if it is
    /// already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn block(&self, address: &str, reason: Option<&str>) -> Result<()> {
        let normalized = normalize_address(address);

        sqlx::query(
            r"
            INSERT INTO blocked_numbers (address, reason) VALUES (?, ?)
            ON CONFLICT(address) DO UPDATE SET reason = excluded.reason
            ",
        )
        .bind(&normalized)
        .bind(reason)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove an address from the block list. Removing an absent address is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn unblock(&self, address: &str) -> Result<()> {
        let normalized = normalize_address(address);

        sqlx::query(
            r"
            DELETE FROM blocked_numbers WHERE address = ?
            ",
        )
        .bind(&normalized)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Whether an address is on the block list.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn is_blocked(&self, address: &str) -> Result<bool> {
        let normalized = normalize_address(address);

        let row = sqlx::query(
            r"
            SELECT 1 AS present FROM blocked_numbers WHERE address = ?
            ",
        )
        .bind(&normalized)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    /// List every blocked address, most recently blocked first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn blocked_numbers(&self) -> Result<Vec<BlockedNumber>> {
        let rows = sqlx::query(
            r"
            SELECT address, reason FROM blocked_numbers ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| BlockedNumber {
                address: row.get("address"),
                reason: row.get("reason"),
            })
            .collect())
    }
}

#[async_trait]
impl BlockingClient for BlockingRepository {
    async fn get_action(&self, address: &str) -> Result<BlockAction> {
        let normalized = normalize_address(address);

        let row = sqlx::query(
            r"
            SELECT reason FROM blocked_numbers WHERE address = ?
            ",
        )
        .bind(&normalized)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map_or(BlockAction::Unblock, |r| BlockAction::Block {
            reason: r.get("reason"),
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_address_is_unblock() {
        let repo = BlockingRepository::in_memory().await.unwrap();

        let action = repo.get_action("5550102030").await.unwrap();
        assert_eq!(action, BlockAction::Unblock);
    }

    #[tokio::test]
    async fn test_blocked_address_reports_reason() {
        let repo = BlockingRepository::in_memory().await.unwrap();

        repo.block("5550102030", Some("spam")).await.unwrap();

        let action = repo.get_action("5550102030").await.unwrap();
        assert_eq!(
            action,
            BlockAction::Block {
                reason: Some("spam".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_lookup_normalizes_formatting() {
        let repo = BlockingRepository::in_memory().await.unwrap();

        repo.block("+1 (555) 010-2030", None).await.unwrap();

        assert!(repo.is_blocked("+15550102030").await.unwrap());
        let action = repo.get_action("+1-555-010-2030").await.unwrap();
        assert!(action.is_block());
    }

    #[tokio::test]
    async fn test_unblock_removes_entry() {
        let repo = BlockingRepository::in_memory().await.unwrap();

        repo.block("5550102030", None).await.unwrap();
        repo.unblock("5550102030").await.unwrap();
        // Unblocking again is a no-op.
        repo.unblock("5550102030").await.unwrap();

        assert!(!repo.is_blocked("5550102030").await.unwrap());
        assert_eq!(
            repo.get_action("5550102030").await.unwrap(),
            BlockAction::Unblock
        );
    }

    #[tokio::test]
    async fn test_reblock_updates_reason() {
        let repo = BlockingRepository::in_memory().await.unwrap();

        repo.block("5550102030", Some("old")).await.unwrap();
        repo.block("5550102030", Some("new")).await.unwrap();

        let blocked = repo.blocked_numbers().await.unwrap();
        assert_eq!(blocked.len(), 1);
        assert_eq!(blocked[0].reason, Some("new".to_string()));
    }
}
