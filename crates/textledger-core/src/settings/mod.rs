//! Persisted application settings and the configuration port.

mod repository;

use async_trait::async_trait;

use crate::Result;

pub use repository::SettingsRepository;

/// Port for the configuration values intake consults.
#[async_trait]
pub trait Settings: Send + Sync {
    /// Whether messages from blocked senders are silently dropped instead of
    /// being stored on a blocked conversation.
    async fn drop_blocked(&self) -> Result<bool>;

    /// Identifier of the active blocking backend, recorded on conversations
    /// it blocks.
    async fn blocking_backend(&self) -> Result<i64>;
}
