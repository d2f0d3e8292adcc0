//! Admission policy: attribute predicates gating transition applicability.
//!
//! A single shared policy applies to every transition in this version, but
//! the type is modeled per-transition so a future table can vary it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::node::NodeSnapshot;

/// Require/exclude predicates over node attributes.
///
/// A transition is applicable to a node iff every `requires` entry matches
/// the node's attribute and no `excludes` entry does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionPolicy {
    /// Attribute path to required value.
    pub requires: BTreeMap<String, String>,
    /// Attribute path to forbidden value.
    pub excludes: BTreeMap<String, String>,
}

impl AdmissionPolicy {
    /// The shared power-control policy: the node's platform attribute must
    /// equal the configured platform string; nothing is excluded.
    #[must_use]
    pub fn power_control(platform_path: impl Into<String>, platform: impl Into<String>) -> Self {
        let mut requires = BTreeMap::new();
        requires.insert(platform_path.into(), platform.into());
        Self {
            requires,
            excludes: BTreeMap::new(),
        }
    }

    /// Add a required attribute value, builder-style.
    #[must_use]
    pub fn require(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.requires.insert(path.into(), value.into());
        self
    }

    /// Add an excluded attribute value, builder-style.
    #[must_use]
    pub fn exclude(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.excludes.insert(path.into(), value.into());
        self
    }

    /// Whether the node satisfies this policy.
    ///
    /// A missing required attribute fails the predicate; a missing excluded
    /// attribute trivially passes it.
    #[must_use]
    pub fn admits(&self, node: &NodeSnapshot) -> bool {
        let required = self
            .requires
            .iter()
            .all(|(path, value)| node.attr(path) == Some(value.as_str()));
        let excluded = self
            .excludes
            .iter()
            .any(|(path, value)| node.attr(path) == Some(value.as_str()));
        required && !excluded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeId;

    fn powerman_node() -> NodeSnapshot {
        NodeSnapshot::new(NodeId::generate()).with_attr("/Platform", "powerman")
    }

    #[test]
    fn matching_platform_admits() {
        let policy = AdmissionPolicy::power_control("/Platform", "powerman");
        assert!(policy.admits(&powerman_node()));
    }

    #[test]
    fn mismatched_platform_rejects() {
        let policy = AdmissionPolicy::power_control("/Platform", "powerman");
        let node = NodeSnapshot::new(NodeId::generate()).with_attr("/Platform", "vbox");
        assert!(!policy.admits(&node));
    }

    #[test]
    fn missing_required_attribute_rejects() {
        let policy = AdmissionPolicy::power_control("/Platform", "powerman");
        let node = NodeSnapshot::new(NodeId::generate());
        assert!(!policy.admits(&node));
    }

    #[test]
    fn exclude_overrides_requires() {
        let policy = AdmissionPolicy::power_control("/Platform", "powerman")
            .exclude("/Role", "head");

        let worker = powerman_node().with_attr("/Role", "worker");
        assert!(policy.admits(&worker));

        let head = powerman_node().with_attr("/Role", "head");
        assert!(!policy.admits(&head));
    }

    #[test]
    fn empty_policy_admits_everything() {
        let policy = AdmissionPolicy::default();
        assert!(policy.admits(&NodeSnapshot::new(NodeId::generate())));
    }
}
