//! Error types for the core crate.

use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by core type construction and validation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Two transitions in the table share a name.
    #[error("duplicate transition name: {0}")]
    DuplicateTransition(String),

    /// A transition's source and target states are equal.
    #[error("transition {0} is a self-loop")]
    SelfLoop(String),

    /// A transition's source state cannot be reached from `UNKNOWN`.
    #[error("transition {name} starts from {state}, which is unreachable from UNKNOWN")]
    Unreachable {
        /// The offending transition.
        name: String,
        /// The unreachable source state.
        state: String,
    },

    /// A value token did not name a known enumeration member.
    #[error("unknown value token: {0}")]
    UnknownValueId(String),
}
