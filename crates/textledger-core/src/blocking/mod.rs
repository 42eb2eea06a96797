//! Sender blocking: the per-address block list and the client port.
//!
//! Intake asks a [`BlockingClient`] what to do with a sender before anything
//! is persisted. The bundled [`BlockingRepository`] answers from the local
//! block list; alternative backends (a carrier service, a third-party
//! blocker) implement the same trait.

mod client;
mod model;
mod repository;

pub use client::BlockingClient;
pub use model::BlockAction;
pub use repository::{BlockedNumber, BlockingRepository};

/// Backend identifier recorded on conversations blocked by the bundled
/// block-list client.
pub const INTERNAL_BACKEND: i64 = 0;
