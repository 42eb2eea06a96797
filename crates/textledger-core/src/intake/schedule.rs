//! Queueing messages for later delivery.

use std::sync::Arc;

use tracing::debug;

use crate::Result;
use crate::scheduled::{AlarmScheduler, ScheduledMessage, ScheduledMessageRepository};

/// Save a scheduled message and refresh the send alarm.
pub struct AddScheduledMessage {
    scheduled: Arc<ScheduledMessageRepository>,
    alarms: Arc<dyn AlarmScheduler>,
}

impl AddScheduledMessage {
    /// Wire the interactor to the queue and the alarm backend.
    #[must_use]
    pub fn new(scheduled: Arc<ScheduledMessageRepository>, alarms: Arc<dyn AlarmScheduler>) -> Self {
        Self { scheduled, alarms }
    }

    /// Persist the message and re-derive the wake-up alarm.
    ///
    /// # Errors
    ///
    /// Propagates queue or alarm failures; the saved message is not removed
    /// if rescheduling fails.
    pub async fn execute(&self, message: &ScheduledMessage) -> Result<i64> {
        let id = self.scheduled.save(message).await?;
        debug!(id, send_at = %message.send_at, "queued scheduled message");
        self.alarms.reschedule().await?;
        Ok(id)
    }
}
