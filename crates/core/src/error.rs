//! Domain error model.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Deterministic rejection of a command by domain rules.
///
/// Retrying the same command against the same state fails the same way.
/// Port, storage and transport failures are separate error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed input: non-positive quantity, empty order, unparsable id.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The command targets the wrong tenant or aggregate.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// The aggregate has no history yet.
    #[error("not found")]
    NotFound,

    /// The aggregate's current state rejects the command (already created,
    /// already planned, order assigned twice, stale version).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Rejections caused by the caller's input rather than aggregate state.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvariantViolation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_conflicts_are_not_input_errors() {
        assert!(DomainError::validation("quantity must be positive").is_input_error());
        assert!(DomainError::invariant("tenant mismatch").is_input_error());
        assert!(!DomainError::conflict("load is already planned").is_input_error());
        assert!(!DomainError::not_found().is_input_error());
    }
}
