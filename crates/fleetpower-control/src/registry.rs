//! View onto the external node registry.
//!
//! The registry is owned by the fabric; the controller only pulls a full
//! snapshot per reconciliation pass and never caches node records across
//! calls.

use async_trait::async_trait;

use fleetpower_core::NodeSnapshot;

use crate::error::Result;

/// Read access to the fabric's node registry.
///
/// Implemented by the host fabric; tests use in-memory stubs.
#[async_trait]
pub trait NodeRegistry: Send + Sync {
    /// Fetch an attribute snapshot of every node the fabric knows about.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Registry` if the registry cannot be queried.
    async fn snapshot(&self) -> Result<Vec<NodeSnapshot>>;
}
