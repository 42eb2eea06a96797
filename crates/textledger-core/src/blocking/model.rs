//! Blocking decision model.

/// A blocking backend's decision for one sender address.
///
/// Pure input to the intake pipeline; decisions are never persisted by the
/// pipeline itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockAction {
    /// The sender is blocked, optionally with a backend-reported reason.
    Block {
        /// Reason reported by the backend, surfaced on the conversation.
        reason: Option<String>,
    },
    /// The sender is known good; a previously blocked conversation should be
    /// unblocked.
    Unblock,
    /// The backend has no opinion about this sender.
    None,
}

impl BlockAction {
    /// Whether this decision blocks the sender.
    #[must_use]
    pub const fn is_block(&self) -> bool {
        matches!(self, Self::Block { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_block() {
        assert!(BlockAction::Block { reason: None }.is_block());
        assert!(
            BlockAction::Block {
                reason: Some("spam".to_string())
            }
            .is_block()
        );
        assert!(!BlockAction::Unblock.is_block());
        assert!(!BlockAction::None.is_block());
    }
}
