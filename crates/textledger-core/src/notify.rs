//! Presentation refresh ports.
//!
//! Fire-and-forget triggers the intake pipeline raises on its success path.
//! Implementations live outside this crate (desktop notifier, launcher
//! integration); the pipeline only holds the trait objects.

use async_trait::async_trait;

use crate::Result;
use crate::conversation::ThreadId;
use crate::message::MessageId;

/// Port for user-facing message notifications.
#[async_trait]
pub trait NotificationManager: Send + Sync {
    /// Refresh the notification for a conversation after new activity.
    async fn update(&self, thread_id: ThreadId) -> Result<()>;

    /// Surface a failed send for a message.
    async fn notify_failed(&self, message_id: MessageId) -> Result<()>;
}

/// Port for launcher shortcut refresh.
#[async_trait]
pub trait ShortcutManager: Send + Sync {
    /// Rebuild the launcher's conversation shortcuts.
    async fn update_shortcuts(&self) -> Result<()>;
}

/// Port for the unread-count badge.
#[async_trait]
pub trait BadgeManager: Send + Sync {
    /// Recompute the unread badge count.
    async fn recount(&self) -> Result<()>;
}
