//! Blocking policy port.

use async_trait::async_trait;

use super::model::BlockAction;
use crate::Result;

/// Port queried for a block/unblock decision per sender address.
///
/// Intake awaits the decision before proceeding; implementations are expected
/// to answer from fast local state, not a network round trip.
#[async_trait]
pub trait BlockingClient: Send + Sync {
    /// Decide what to do with a sender address.
    async fn get_action(&self, address: &str) -> Result<BlockAction>;
}
