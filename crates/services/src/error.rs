//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::LevelId;
use storage::StorageError;

/// Errors emitted while starting or driving a quiz session.
///
/// Only start-up can fail; operations on a running session that arrive at the
/// wrong time are ignored instead of raised.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("unknown level `{0}`")]
    UnknownLevel(LevelId),
    #[error("level `{0}` requires premium")]
    Locked(LevelId),
    #[error("premium status has not finished loading")]
    PremiumPending,
    #[error("session has been torn down")]
    Closed,
}

/// Errors emitted by `PremiumGate`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PremiumError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while encoding or decoding a serialized result.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResultError {
    #[error("malformed result payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors emitted while reading `SessionConfig`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("initial lives must be > 0")]
    InvalidInitialLives,
    #[error("tick interval must be > 0")]
    InvalidTickInterval,
}
