//! Scheduled messages: queue a message to be sent at a later instant.

mod model;
mod repository;

use async_trait::async_trait;

use crate::Result;

pub use model::ScheduledMessage;
pub use repository::ScheduledMessageRepository;

/// Port for the alarm backend that wakes the sender when a scheduled message
/// comes due.
#[async_trait]
pub trait AlarmScheduler: Send + Sync {
    /// Re-derive the wake-up alarm from the scheduled-message queue.
    async fn reschedule(&self) -> Result<()>;
}
