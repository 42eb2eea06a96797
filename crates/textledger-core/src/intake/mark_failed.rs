//! Failed-send bookkeeping.

use std::sync::Arc;

use crate::Result;
use crate::message::{MessageId, MessageStore};
use crate::notify::NotificationManager;

/// Record a failed send and surface it to the user.
pub struct MarkFailed {
    message_store: Arc<dyn MessageStore>,
    notifications: Arc<dyn NotificationManager>,
}

impl MarkFailed {
    /// Wire the interactor to its ports.
    #[must_use]
    pub fn new(
        message_store: Arc<dyn MessageStore>,
        notifications: Arc<dyn NotificationManager>,
    ) -> Self {
        Self {
            message_store,
            notifications,
        }
    }

    /// Mark the message failed with the platform result code, then raise the
    /// failure notification.
    ///
    /// # Errors
    ///
    /// Propagates the first port failure; the status update is not rolled
    /// back if the notification fails.
    pub async fn execute(&self, message_id: MessageId, result_code: i32) -> Result<()> {
        self.message_store
            .mark_failed(message_id, result_code)
            .await?;
        self.notifications.notify_failed(message_id).await?;
        Ok(())
    }
}
