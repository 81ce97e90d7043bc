//! Error taxonomy for the engine.

use thiserror::Error;

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// Top-level error type for all engine errors.
///
/// Everything except `InvariantViolation` is recoverable: illegal actions
/// and unpayable costs roll the game back to the last legal state, and
/// `AwaitingChoice` only signals that the API was used while a decision is
/// pending. An invariant violation halts the engine instance.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The action violates a restriction, targeting, or cost rule.
    #[error("illegal action: {0}")]
    IllegalAction(String),

    /// The required assets cannot be produced.
    #[error("cost cannot be paid: {0}")]
    UnpayableCost(String),

    /// A targeting requirement cannot be satisfied; nothing was mutated.
    #[error("no legal target: {0}")]
    NoLegalTarget(String),

    /// Exactly one decision is pending and must be supplied first.
    #[error("awaiting player decision: {0}")]
    AwaitingChoice(String),

    /// Stack/zone/ledger consistency check failed. Fatal for this game.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl EngineError {
    /// Only invariant violations are fatal.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::InvariantViolation(_))
    }
}
