//! Incoming-message intake and the other write-path interactors.
//!
//! [`ReceiveSms`] is the triage pipeline for delivered fragment batches:
//! block/drop/accept, persist, update conversation state, fan out
//! presentation refreshes. [`MarkFailed`] and [`AddScheduledMessage`] are the
//! smaller write paths sharing the same port-injection shape.

mod fragment;
mod mark_failed;
mod receive;
mod schedule;

pub use fragment::{IncomingFragment, compose_body};
pub use mark_failed::MarkFailed;
pub use receive::ReceiveSms;
pub use schedule::AddScheduledMessage;
