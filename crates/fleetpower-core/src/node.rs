//! Node identifiers and registry snapshots.
//!
//! Node records are owned by the external registry. This crate only ever
//! sees a read-only snapshot per operation: an opaque identifier plus the
//! attribute map addressed by path (`/Platform`, a name attribute, an
//! endpoint attribute).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a managed node, assigned by the external registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Generate a fresh random node ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Join a node identifier and an attribute path into a target URL.
///
/// Observation events address attributes as `<node-id>/<path>`.
#[must_use]
pub fn node_url_join(id: &NodeId, path: &str) -> String {
    format!("{id}{path}")
}

/// A read-only, per-operation view of one registry node record.
///
/// Snapshots are never cached across operations; the registry remains the
/// single source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// Registry identifier of the node.
    pub id: NodeId,
    /// Attribute values keyed by attribute path.
    pub attrs: BTreeMap<String, String>,
}

impl NodeSnapshot {
    /// Create an empty snapshot for the given node.
    #[must_use]
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            attrs: BTreeMap::new(),
        }
    }

    /// Add an attribute, builder-style.
    #[must_use]
    pub fn with_attr(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(path.into(), value.into());
        self
    }

    /// Look up an attribute by path.
    #[must_use]
    pub fn attr(&self, path: &str) -> Option<&str> {
        self.attrs.get(path).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_lookup() {
        let node = NodeSnapshot::new(NodeId::generate())
            .with_attr("/Platform", "powerman")
            .with_attr("/Powerman/Name", "n01");

        assert_eq!(node.attr("/Platform"), Some("powerman"));
        assert_eq!(node.attr("/Powerman/Name"), Some("n01"));
        assert_eq!(node.attr("/Powerman/Server"), None);
    }

    #[test]
    fn url_join() {
        let id = NodeId::from_uuid(Uuid::nil());
        assert_eq!(
            node_url_join(&id, "/PhysState"),
            "00000000-0000-0000-0000-000000000000/PhysState"
        );
    }

    #[test]
    fn node_id_serde_is_transparent() {
        let id = NodeId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
