//! Error types for engine operations.
//!
//! Nothing in ordinary game flow raises: a round with no submitted actions,
//! an empty relic pool, or a zero-vote ballot are expected outcomes, not
//! errors. These variants exist to *signal* an operation that must not
//! mutate state: an illegal action, an unknown key, a full lobby, or any
//! call against a session that already ended.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors reported to callers of session and registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The action is illegal for the actor's role, phase, or resources.
    /// Reported to the actor; no state was mutated.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The session or player key is unknown. No state was mutated.
    #[error("not found: {0}")]
    NotFound(String),

    /// A join beyond the player cap, or a join outside the lobby phase.
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// The session already reached `Ended`. The operation was a no-op;
    /// callers log and move on.
    #[error("session already ended")]
    AlreadyTerminal,
}
