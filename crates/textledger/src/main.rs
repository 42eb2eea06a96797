//! `TextLedger` - SMS conversation store with sender blocking.
//!
//! Composition root: wires the intake pipeline to its ports at process start
//! and exposes admin commands over the store.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod ports;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ports::{DesktopNotifier, LauncherShortcuts, SendAlarm, UnreadBadge};
use textledger_core::{
    AddScheduledMessage, BlockingClient, BlockingRepository, ConversationRepository,
    ConversationStore, IncomingFragment, MarkFailed, MessageId, MessageRepository, MessageStore,
    NotificationManager, ReceiveSms, ScheduledMessage, ScheduledMessageRepository, Settings,
    SettingsRepository, ThreadId, db,
};

#[derive(Parser)]
#[command(name = "textledger", version, about = "SMS conversation store with sender blocking")]
struct Cli {
    /// Path to the SQLite database. Defaults to the platform data directory.
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a delivered fragment batch through the intake pipeline.
    Receive {
        /// Originating address of the batch.
        address: String,
        /// Body parts in delivery order; repeat for multipart messages.
        #[arg(long = "part", required = true)]
        parts: Vec<String>,
        /// Carrier subscription that received the batch.
        #[arg(long, default_value_t = 1)]
        sub_id: i32,
        /// Delivery timestamp in milliseconds since the epoch; defaults to now.
        #[arg(long)]
        time: Option<i64>,
    },
    /// Add an address to the block list and block its conversation.
    Block {
        /// Address to block.
        address: String,
        /// Reason to record with the block.
        #[arg(long)]
        reason: Option<String>,
    },
    /// Remove an address from the block list and unblock its conversation.
    Unblock {
        /// Address to unblock.
        address: String,
    },
    /// List blocked addresses.
    Blocked,
    /// List conversations, most recently active first.
    Conversations,
    /// List the messages in a thread, oldest first.
    Messages {
        /// Thread to list.
        thread_id: i64,
    },
    /// Mark every message in a thread as read.
    Read {
        /// Thread to mark read.
        thread_id: i64,
    },
    /// Hide a thread from the active list.
    Archive {
        /// Thread to archive.
        thread_id: i64,
    },
    /// Return a thread to the active list.
    Unarchive {
        /// Thread to unarchive.
        thread_id: i64,
    },
    /// Mark a message as failed and raise the failure notification.
    Fail {
        /// Message to mark failed.
        message_id: i64,
        /// Platform result code to record.
        result_code: i32,
    },
    /// Queue a message to be sent later.
    Schedule {
        /// When to send, RFC 3339 (e.g. 2026-08-05T09:00:00Z).
        #[arg(long)]
        at: String,
        /// Recipient addresses; repeat for multiple.
        #[arg(long = "to", required = true)]
        recipients: Vec<String>,
        /// Message body text.
        body: String,
        /// Carrier subscription to send from.
        #[arg(long, default_value_t = 1)]
        sub_id: i32,
        /// Send individual copies instead of one group message.
        #[arg(long)]
        individually: bool,
    },
    /// List the scheduled-message queue.
    Scheduled,
    /// Read or change stored settings.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current settings.
    Show,
    /// Enable or disable silently dropping messages from blocked senders.
    SetDropBlocked {
        /// New value.
        value: bool,
    },
}

/// Repositories and ports wired over one shared pool.
struct App {
    messages: Arc<MessageRepository>,
    conversations: Arc<ConversationRepository>,
    blocking: Arc<BlockingRepository>,
    settings: Arc<SettingsRepository>,
    scheduled: Arc<ScheduledMessageRepository>,
    notifier: Arc<DesktopNotifier>,
}

impl App {
    async fn open(database: &str) -> Result<Self> {
        let pool = db::connect(database)
            .await
            .with_context(|| format!("opening database {database}"))?;

        let messages = Arc::new(MessageRepository::with_pool(pool.clone()));
        let conversations = Arc::new(ConversationRepository::with_pool(pool.clone()));
        let blocking = Arc::new(BlockingRepository::with_pool(pool.clone()));
        let settings = Arc::new(SettingsRepository::with_pool(pool.clone()));
        let scheduled = Arc::new(ScheduledMessageRepository::with_pool(pool));
        let notifier = Arc::new(DesktopNotifier::new(
            Arc::clone(&conversations),
            Arc::clone(&messages),
        ));

        Ok(Self {
            messages,
            conversations,
            blocking,
            settings,
            scheduled,
            notifier,
        })
    }

    fn receive_pipeline(&self) -> ReceiveSms {
        ReceiveSms::new(
            Arc::clone(&self.conversations) as Arc<dyn ConversationStore>,
            Arc::clone(&self.blocking) as Arc<dyn BlockingClient>,
            Arc::clone(&self.settings) as Arc<dyn Settings>,
            Arc::clone(&self.messages) as Arc<dyn MessageStore>,
            Arc::clone(&self.notifier) as Arc<dyn NotificationManager>,
            Arc::new(UnreadBadge::new(Arc::clone(&self.conversations))),
            Arc::new(LauncherShortcuts::new(Arc::clone(&self.conversations))),
        )
    }
}

fn default_database_path() -> Result<PathBuf> {
    let dir = dirs::data_dir()
        .context("no platform data directory")?
        .join("textledger");
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    Ok(dir.join("textledger.db"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "textledger=info,textledger_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let database = match cli.database {
        Some(path) => path,
        None => default_database_path()?,
    };
    let database = database.to_string_lossy().into_owned();
    info!(%database, "opening store");

    let app = App::open(&database).await?;

    match cli.command {
        Command::Receive {
            address,
            parts,
            sub_id,
            time,
        } => {
            let time = time.unwrap_or_else(|| Utc::now().timestamp_millis());
            let fragments: Vec<IncomingFragment> = parts
                .iter()
                .map(|part| IncomingFragment::new(&address, part, time))
                .collect();

            app.receive_pipeline().execute(sub_id, &fragments).await?;
            println!("received {} fragment(s) from {address}", fragments.len());
        }
        Command::Block { address, reason } => {
            app.blocking.block(&address, reason.as_deref()).await?;
            if let Some(conversation) = app.conversations.conversation_by_address(&address).await? {
                let backend = app.settings.blocking_backend().await?;
                app.conversations
                    .mark_blocked(&[conversation.id], backend, reason.as_deref())
                    .await?;
            }
            println!("blocked {address}");
        }
        Command::Unblock { address } => {
            app.blocking.unblock(&address).await?;
            if let Some(conversation) = app.conversations.conversation_by_address(&address).await? {
                app.conversations.mark_unblocked(conversation.id).await?;
            }
            println!("unblocked {address}");
        }
        Command::Blocked => {
            for entry in app.blocking.blocked_numbers().await? {
                println!(
                    "{:<16}  {}",
                    entry.address,
                    entry.reason.unwrap_or_default()
                );
            }
        }
        Command::Conversations => {
            for conversation in app.conversations.conversations().await? {
                let mut flags = Vec::new();
                if conversation.blocked {
                    flags.push("blocked");
                }
                if conversation.archived {
                    flags.push("archived");
                }
                println!(
                    "{:>4}  {:<16}  {:>3} unread  {:<18}  {}",
                    conversation.id,
                    conversation.address,
                    conversation.unread_count,
                    flags.join(","),
                    conversation.snippet.unwrap_or_default()
                );
            }
        }
        Command::Messages { thread_id } => {
            for message in app
                .messages
                .messages_for_thread(ThreadId::new(thread_id))
                .await?
            {
                let read = if message.read { "read" } else { "unread" };
                println!(
                    "{:>4}  {}  {:<8}  {:<6}  {}",
                    message.id,
                    message.date,
                    message.status.as_str(),
                    read,
                    message.body
                );
            }
        }
        Command::Read { thread_id } => {
            let thread_id = ThreadId::new(thread_id);
            app.messages.mark_read(thread_id).await?;
            app.conversations.update_conversations(thread_id).await?;
            println!("marked thread {thread_id} read");
        }
        Command::Archive { thread_id } => {
            app.conversations
                .mark_archived(ThreadId::new(thread_id))
                .await?;
            println!("archived thread {thread_id}");
        }
        Command::Unarchive { thread_id } => {
            app.conversations
                .mark_unarchived(ThreadId::new(thread_id))
                .await?;
            println!("unarchived thread {thread_id}");
        }
        Command::Fail {
            message_id,
            result_code,
        } => {
            let interactor = MarkFailed::new(
                Arc::clone(&app.messages) as Arc<dyn MessageStore>,
                app.notifier as Arc<dyn NotificationManager>,
            );
            interactor
                .execute(MessageId::new(message_id), result_code)
                .await?;
            println!("marked message {message_id} failed ({result_code})");
        }
        Command::Schedule {
            at,
            recipients,
            body,
            sub_id,
            individually,
        } => {
            let send_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&at)
                .with_context(|| format!("parsing --at {at}"))?
                .with_timezone(&Utc);

            let mut message = ScheduledMessage::new(send_at, sub_id, recipients, &body);
            message.send_as_group = !individually;

            let alarms = Arc::new(SendAlarm::new(Arc::clone(&app.scheduled)));
            let interactor = AddScheduledMessage::new(Arc::clone(&app.scheduled), alarms);
            let id = interactor.execute(&message).await?;
            println!("scheduled message {id} for {send_at}");
        }
        Command::Scheduled => {
            for message in app.scheduled.list().await? {
                println!(
                    "{:>4}  {}  to {}  {}",
                    message.id.unwrap_or_default(),
                    message.send_at,
                    message.recipients.join(","),
                    message.body
                );
            }
        }
        Command::Config { action } => match action {
            ConfigAction::Show => {
                println!("drop_blocked = {}", app.settings.drop_blocked().await?);
                println!(
                    "blocking_backend = {}",
                    app.settings.blocking_backend().await?
                );
            }
            ConfigAction::SetDropBlocked { value } => {
                app.settings.set_drop_blocked(value).await?;
                println!("drop_blocked = {value}");
            }
        },
    }

    Ok(())
}
