//! Desktop implementations of the presentation and alarm ports.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use textledger_core::{
    AlarmScheduler, BadgeManager, Conversation, ConversationRepository, ConversationStore, Error,
    MessageId, MessageRepository, NotificationManager, Result, ScheduledMessageRepository,
    ShortcutManager, ThreadId,
};

/// Notification port backed by the desktop notification daemon.
pub struct DesktopNotifier {
    conversations: Arc<ConversationRepository>,
    messages: Arc<MessageRepository>,
}

impl DesktopNotifier {
    /// Create a notifier reading conversation and message details from the
    /// given repositories.
    #[must_use]
    pub fn new(
        conversations: Arc<ConversationRepository>,
        messages: Arc<MessageRepository>,
    ) -> Self {
        Self {
            conversations,
            messages,
        }
    }

    fn show(summary: &str, body: &str) -> Result<()> {
        notify_rust::Notification::new()
            .appname("textledger")
            .summary(summary)
            .body(body)
            .show()
            .map_err(|e| Error::Refresh(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl NotificationManager for DesktopNotifier {
    async fn update(&self, thread_id: ThreadId) -> Result<()> {
        let Some(conversation) = self
            .conversations
            .get_or_create_conversation(thread_id)
            .await?
        else {
            return Ok(());
        };

        let body = conversation.snippet.clone().unwrap_or_default();
        Self::show(&conversation.address, &body)
    }

    async fn notify_failed(&self, message_id: MessageId) -> Result<()> {
        let Some(message) = self.messages.message(message_id).await? else {
            return Ok(());
        };

        let summary = format!("Message to {} failed", message.address);
        Self::show(&summary, &message.body)
    }
}

/// Shortcut port publishing the most active conversations.
///
/// Desktops have no launcher shortcut surface to push to, so the refresh is
/// recorded in the log with the pin candidates it derived.
pub struct LauncherShortcuts {
    conversations: Arc<ConversationRepository>,
}

impl LauncherShortcuts {
    /// Create a shortcut port over the conversation list.
    #[must_use]
    pub const fn new(conversations: Arc<ConversationRepository>) -> Self {
        Self { conversations }
    }
}

#[async_trait]
impl ShortcutManager for LauncherShortcuts {
    async fn update_shortcuts(&self) -> Result<()> {
        let pinned: Vec<String> = self
            .conversations
            .conversations()
            .await?
            .into_iter()
            .filter(|c: &Conversation| !c.blocked && !c.archived)
            .take(3)
            .map(|c| c.address)
            .collect();

        debug!(?pinned, "refreshed conversation shortcuts");
        Ok(())
    }
}

/// Badge port recomputing the unread total.
pub struct UnreadBadge {
    conversations: Arc<ConversationRepository>,
}

impl UnreadBadge {
    /// Create a badge port over the conversation list.
    #[must_use]
    pub const fn new(conversations: Arc<ConversationRepository>) -> Self {
        Self { conversations }
    }
}

#[async_trait]
impl BadgeManager for UnreadBadge {
    async fn recount(&self) -> Result<()> {
        let unread = self.conversations.total_unread().await?;
        info!(unread, "unread badge recount");
        Ok(())
    }
}

/// Alarm port reporting the next scheduled send.
///
/// The CLI has no resident process to arm a timer in; the reschedule derives
/// and logs the next due instant so a wrapping service can arm one.
pub struct SendAlarm {
    scheduled: Arc<ScheduledMessageRepository>,
}

impl SendAlarm {
    /// Create an alarm port over the scheduled-message queue.
    #[must_use]
    pub const fn new(scheduled: Arc<ScheduledMessageRepository>) -> Self {
        Self { scheduled }
    }
}

#[async_trait]
impl AlarmScheduler for SendAlarm {
    async fn reschedule(&self) -> Result<()> {
        match self.scheduled.list().await?.first() {
            Some(next) => info!(send_at = %next.send_at, "next scheduled send"),
            None => debug!("scheduled-message queue is empty"),
        }
        Ok(())
    }
}
