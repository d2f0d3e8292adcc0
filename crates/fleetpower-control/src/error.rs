//! Error types for the controller.
//!
//! Every error here is fatal only to the single node action that raised it;
//! the dispatch loop and the reconciler keep running. Retry is owned by the
//! external scheduler, which re-offers a mutation after its timeout.

use thiserror::Error;

/// A result type using `ControlError`.
pub type Result<T> = std::result::Result<T, ControlError>;

/// Errors that can occur while dispatching mutations or reconciling state.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The node failed the admission predicate or is not on the allow-list.
    #[error("node {node} is not admissible for power control")]
    Admission {
        /// Node name or identifier as far as it could be resolved.
        node: String,
    },

    /// A required node attribute was missing from the registry snapshot.
    #[error("node {node} is missing required attribute {missing}")]
    AttributeResolution {
        /// Node identifier.
        node: String,
        /// The attribute path that could not be resolved.
        missing: String,
    },

    /// A backend power-control invocation failed.
    #[error("{action} failed for node {node}: {detail}")]
    Backend {
        /// The backend action that failed (`power-on`, `power-off`, `query`).
        action: &'static str,
        /// The node the action targeted.
        node: String,
        /// Failure detail from the backend.
        detail: String,
    },

    /// The backend's query output did not have the expected shape.
    #[error("could not parse power query result for node {node}: {reason}")]
    QueryParse {
        /// The node that was queried.
        node: String,
        /// What was wrong with the output.
        reason: String,
    },

    /// The external node registry could not be queried.
    #[error("node registry query failed: {0}")]
    Registry(String),
}

impl ControlError {
    /// True if this error indicates the backend's output was malformed, as
    /// opposed to the invocation itself failing.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::QueryParse { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ControlError::Admission {
            node: "n01".to_string(),
        };
        assert_eq!(err.to_string(), "node n01 is not admissible for power control");

        let err = ControlError::Backend {
            action: "power-on",
            node: "n02".to_string(),
            detail: "exit status 1".to_string(),
        };
        assert!(err.to_string().contains("power-on"));
        assert!(err.to_string().contains("n02"));
    }

    #[test]
    fn parse_predicate() {
        let err = ControlError::QueryParse {
            node: "n01".to_string(),
            reason: "expected 3 result lines".to_string(),
        };
        assert!(err.is_parse());
        assert!(!ControlError::Registry("down".to_string()).is_parse());
    }
}
