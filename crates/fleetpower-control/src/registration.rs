//! Startup registration payload.
//!
//! At startup the host hands the fabric one [`ModuleRegistration`]: the
//! declared transitions with their timeouts and failure sink, the
//! discoverable value tokens per attribute path, and the service entry
//! name. This is pure data; how it is delivered is the host's concern, and
//! the fabric's scheduler owns everything declared here from then on.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use fleetpower_core::{
    AdmissionPolicy, PowerState, RunState, ServiceState, TransitionTable, PHYS_STATE_PATH,
    RUN_STATE_PATH, SERVICE_STATE_PATH,
};

/// Name this module registers under and stamps on every observation event.
pub const MODULE_NAME: &str = "fleetpower-control";

/// One transition as declared to the fabric's mutation scheduler.
#[derive(Debug, Clone, Serialize)]
pub struct DeclaredMutation {
    /// Transition name.
    pub name: &'static str,
    /// Attribute path the transition mutates.
    pub path: &'static str,
    /// Source value token.
    pub from: &'static str,
    /// Target value token.
    pub to: &'static str,
    /// Deadline before the scheduler routes the node to `fail_to`.
    pub timeout: Duration,
    /// Required attribute values for this transition to be offered.
    pub requires: BTreeMap<String, String>,
    /// Attribute values excluding a node from this transition.
    pub excludes: BTreeMap<String, String>,
    /// Value token of the universal failure sink.
    pub fail_to: &'static str,
}

/// The complete registration payload published at startup.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleRegistration {
    /// Module name.
    pub module: &'static str,
    /// Named service entry point (the dispatch loop).
    pub service_entry: &'static str,
    /// Declared transitions.
    pub mutations: Vec<DeclaredMutation>,
    /// Discoverable value tokens per attribute path.
    pub discoverables: BTreeMap<&'static str, Vec<&'static str>>,
}

impl ModuleRegistration {
    /// Build the registration payload from the transition table and the
    /// shared admission policy.
    #[must_use]
    pub fn build(table: &TransitionTable, policy: &AdmissionPolicy) -> Self {
        let mutations = table
            .iter()
            .map(|t| DeclaredMutation {
                name: t.name,
                path: PHYS_STATE_PATH,
                from: t.from.as_value_id(),
                to: t.to.as_value_id(),
                timeout: t.timeout,
                requires: policy.requires.clone(),
                excludes: policy.excludes.clone(),
                fail_to: TransitionTable::FAIL_TO.as_value_id(),
            })
            .collect();

        let mut discoverables = BTreeMap::new();
        discoverables.insert(
            PHYS_STATE_PATH,
            PowerState::ALL.iter().map(|s| s.as_value_id()).collect(),
        );
        discoverables.insert(RUN_STATE_PATH, vec![RunState::Unknown.as_value_id()]);
        discoverables.insert(SERVICE_STATE_PATH, vec![ServiceState::Run.as_value_id()]);

        Self {
            module: MODULE_NAME,
            service_entry: "fleetpower",
            mutations,
            discoverables,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build() -> ModuleRegistration {
        let table = TransitionTable::power_control();
        let policy = AdmissionPolicy::power_control("/Platform", "powerman");
        ModuleRegistration::build(&table, &policy)
    }

    #[test]
    fn declares_every_transition() {
        let registration = build();
        assert_eq!(registration.mutations.len(), 5);

        let names: Vec<&str> = registration.mutations.iter().map(|m| m.name).collect();
        for expected in ["UKtoOFF", "OFFtoON", "ONtoOFF", "HANGtoOFF", "UKtoHANG"] {
            assert!(names.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn every_mutation_fails_to_hang() {
        let registration = build();
        assert!(registration.mutations.iter().all(|m| m.fail_to == "HANG"));
        assert!(registration
            .mutations
            .iter()
            .all(|m| m.path == "/PhysState"));
    }

    #[test]
    fn mutations_carry_the_platform_predicate() {
        let registration = build();
        for m in &registration.mutations {
            assert_eq!(m.requires.get("/Platform").map(String::as_str), Some("powerman"));
            assert!(m.excludes.is_empty());
        }
    }

    #[test]
    fn discoverables_cover_the_three_paths() {
        let registration = build();

        let phys = &registration.discoverables["/PhysState"];
        for token in ["UNKNOWN", "OFF", "ON", "HANG"] {
            assert!(phys.contains(&token));
        }

        assert_eq!(registration.discoverables["/RunState"], vec!["RUN_UK"]);
        assert_eq!(
            registration.discoverables["/Services/fleetpower/State"],
            vec!["RUN"]
        );
    }

    #[test]
    fn payload_serializes() {
        let json = serde_json::to_string(&build()).unwrap();
        assert!(json.contains("OFFtoON"));
        assert!(json.contains("fleetpower-control"));
    }
}
