//! The power-state transition table.
//!
//! The table is fixed at process start and consulted, never mutated, by the
//! dispatcher and the registration payload builder. Every transition that
//! times out is routed by the external scheduler to [`TransitionTable::FAIL_TO`];
//! this crate only declares that target, it never enforces the timeout.

use std::time::Duration;

use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::state::PowerState;

/// Transition name: force a discovery cycle for a node of unknown power state.
pub const UK_TO_OFF: &str = "UKtoOFF";
/// Transition name: power a node on.
pub const OFF_TO_ON: &str = "OFFtoON";
/// Transition name: power a node off.
pub const ON_TO_OFF: &str = "ONtoOFF";
/// Transition name: power a hung node off.
pub const HANG_TO_OFF: &str = "HANGtoOFF";
/// Transition name: declared so `HANG` is reachable in the graph; never executed.
pub const UK_TO_HANG: &str = "UKtoHANG";

/// A named, directed power-state transition with a scheduling deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// Unique transition name, matched against inbound mutation requests.
    pub name: &'static str,
    /// Source power state.
    pub from: PowerState,
    /// Target power state.
    pub to: PowerState,
    /// Deadline the external scheduler enforces before routing to the
    /// failure sink.
    pub timeout: Duration,
}

/// The immutable set of transitions this controller declares.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionTable {
    entries: Vec<Transition>,
}

impl TransitionTable {
    /// The universal failure target: every transition that times out is
    /// routed here by the external scheduler.
    pub const FAIL_TO: PowerState = PowerState::Hang;

    /// The fixed power-control transition table.
    ///
    /// `HANGtoOFF` carries a longer timeout: a hung node is left to sit cold
    /// for a few seconds before a power-off attempt is trusted. `UKtoHANG`
    /// only connects `HANG` into the graph and is never executed.
    #[must_use]
    pub fn power_control() -> Self {
        Self {
            entries: vec![
                Transition {
                    name: UK_TO_OFF,
                    from: PowerState::Unknown,
                    to: PowerState::Off,
                    timeout: Duration::from_secs(10),
                },
                Transition {
                    name: OFF_TO_ON,
                    from: PowerState::Off,
                    to: PowerState::On,
                    timeout: Duration::from_secs(10),
                },
                Transition {
                    name: ON_TO_OFF,
                    from: PowerState::On,
                    to: PowerState::Off,
                    timeout: Duration::from_secs(10),
                },
                Transition {
                    name: HANG_TO_OFF,
                    from: PowerState::Hang,
                    to: PowerState::Off,
                    timeout: Duration::from_secs(20),
                },
                Transition {
                    name: UK_TO_HANG,
                    from: PowerState::Unknown,
                    to: PowerState::Hang,
                    timeout: Duration::from_secs(0),
                },
            ],
        }
    }

    /// Look up a transition by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Transition> {
        self.entries.iter().find(|t| t.name == name)
    }

    /// Iterate over all transitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.entries.iter()
    }

    /// Number of declared transitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check the table invariants.
    ///
    /// Names must be unique, no transition may be a self-loop, and every
    /// source state must be reachable from `UNKNOWN`: each `from` is either
    /// `UNKNOWN` itself or the `to` of some other transition.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant as a [`CoreError`].
    pub fn validate(&self) -> Result<()> {
        for (i, t) in self.entries.iter().enumerate() {
            if self.entries[..i].iter().any(|prev| prev.name == t.name) {
                return Err(CoreError::DuplicateTransition(t.name.to_string()));
            }
            if t.from == t.to {
                return Err(CoreError::SelfLoop(t.name.to_string()));
            }
            let reachable = t.from == PowerState::Unknown
                || self.entries.iter().any(|other| other.to == t.from);
            if !reachable {
                return Err(CoreError::Unreachable {
                    name: t.name.to_string(),
                    state: t.from.to_string(),
                });
            }
        }
        Ok(())
    }
}
