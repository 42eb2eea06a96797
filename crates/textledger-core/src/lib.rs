//! # textledger-core
//!
//! Core logic for `TextLedger`, an SMS conversation store.
//!
//! This crate provides:
//! - The incoming-message **intake pipeline**: block/drop/accept triage for
//!   delivered fragment batches, message persistence, conversation state
//!   updates, and notification fan-out
//! - **Sender blocking** - a per-address block list and the client port other
//!   blocking backends can implement
//! - **Message and conversation storage** (`SQLite`)
//! - **Scheduled messages** - queue a message to be sent later
//! - Port traits for the presentation concerns (notifications, launcher
//!   shortcuts, unread badge) that live outside this crate

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod address;
pub mod blocking;
pub mod conversation;
pub mod db;
mod error;
pub mod intake;
pub mod message;
pub mod notify;
pub mod scheduled;
pub mod settings;

pub use address::normalize_address;
pub use blocking::{BlockAction, BlockingClient, BlockingRepository, INTERNAL_BACKEND};
pub use conversation::{Conversation, ConversationRepository, ConversationStore, ThreadId};
pub use error::{Error, Result};
pub use intake::{AddScheduledMessage, IncomingFragment, MarkFailed, ReceiveSms, compose_body};
pub use message::{DeliveryStatus, Message, MessageId, MessageRepository, MessageStore};
pub use notify::{BadgeManager, NotificationManager, ShortcutManager};
pub use scheduled::{AlarmScheduler, ScheduledMessage, ScheduledMessageRepository};
pub use settings::{Settings, SettingsRepository};
