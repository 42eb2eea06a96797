//! Intake pipeline for received SMS batches.

use std::sync::Arc;

use tracing::{debug, warn};

use super::fragment::{IncomingFragment, compose_body};
use crate::Result;
use crate::blocking::{BlockAction, BlockingClient};
use crate::conversation::ConversationStore;
use crate::message::MessageStore;
use crate::notify::{BadgeManager, NotificationManager, ShortcutManager};
use crate::settings::Settings;

/// Triage pipeline for one delivered fragment batch.
///
/// Decides block/drop/accept for the batch's sender, persists the reassembled
/// message, updates conversation state, and triggers the presentation
/// refreshes. Each call runs one batch to a terminal state: dropped, stored
/// without notifying (blocked or missing conversation), or stored and
/// notified.
///
/// Failures propagate to the caller unhandled: no retry, no rollback; a
/// message persisted before a later step fails stays persisted.
///
/// Batches for different senders may run concurrently. Concurrent intake for
/// the *same* thread is not coordinated here; callers wanting that guarantee
/// must serialize batches per thread before invoking.
pub struct ReceiveSms {
    conversation_store: Arc<dyn ConversationStore>,
    blocking_client: Arc<dyn BlockingClient>,
    settings: Arc<dyn Settings>,
    message_store: Arc<dyn MessageStore>,
    notifications: Arc<dyn NotificationManager>,
    badge: Arc<dyn BadgeManager>,
    shortcuts: Arc<dyn ShortcutManager>,
}

impl ReceiveSms {
    /// Wire the pipeline to its ports.
    #[must_use]
    pub fn new(
        conversation_store: Arc<dyn ConversationStore>,
        blocking_client: Arc<dyn BlockingClient>,
        settings: Arc<dyn Settings>,
        message_store: Arc<dyn MessageStore>,
        notifications: Arc<dyn NotificationManager>,
        badge: Arc<dyn BadgeManager>,
        shortcuts: Arc<dyn ShortcutManager>,
    ) -> Self {
        Self {
            conversation_store,
            blocking_client,
            settings,
            message_store,
            notifications,
            badge,
            shortcuts,
        }
    }

    /// Run one delivered batch through intake.
    ///
    /// An empty batch is a no-op: no port is touched.
    ///
    /// # Errors
    ///
    /// Propagates the first port failure; see the type-level notes on
    /// failure semantics.
    pub async fn execute(&self, sub_id: i32, fragments: &[IncomingFragment]) -> Result<()> {
        let Some(first) = fragments.first() else {
            return Ok(());
        };

        // All fragments in a batch share the first fragment's address.
        let address = first.address.as_str();
        let action = self.blocking_client.get_action(address).await?;
        let should_drop = self.settings.drop_blocked().await?;
        debug!(?action, should_drop, "screened sender");

        // If we should drop the message, don't even save it.
        if action.is_block() && should_drop {
            return Ok(());
        }

        let time = first.timestamp_millis;
        let Some(body) = compose_body(fragments) else {
            warn!(address, "batch carried no body text, skipping intake");
            return Ok(());
        };

        let message = self
            .message_store
            .insert_received_sms(sub_id, address, &body, time)
            .await?;

        match &action {
            BlockAction::Block { reason } => {
                self.message_store.mark_read(message.thread_id).await?;
                let backend = self.settings.blocking_backend().await?;
                self.conversation_store
                    .mark_blocked(&[message.thread_id], backend, reason.as_deref())
                    .await?;
            }
            BlockAction::Unblock => {
                self.conversation_store
                    .mark_unblocked(message.thread_id)
                    .await?;
            }
            BlockAction::None => {}
        }

        self.conversation_store
            .update_conversations(message.thread_id)
            .await?;

        // Don't notify for blocked conversations.
        let conversation = self
            .conversation_store
            .get_or_create_conversation(message.thread_id)
            .await?
            .filter(|conversation| !conversation.blocked);
        let Some(conversation) = conversation else {
            return Ok(());
        };

        if conversation.archived {
            self.conversation_store
                .mark_unarchived(conversation.id)
                .await?;
        }

        self.notifications.update(conversation.id).await?;
        self.shortcuts.update_shortcuts().await?;
        self.badge.recount().await?;

        Ok(())
    }
}
