//! Inbound mutation requests and outbound observation events.
//!
//! Both records are ephemeral: a mutation request is consumed once by the
//! dispatcher, an observation event is constructed, emitted downstream, and
//! never stored by this module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::node::{node_url_join, NodeId, NodeSnapshot};
use crate::state::{PowerState, RunState, ServiceState};

/// Attribute path of the physical power condition.
pub const PHYS_STATE_PATH: &str = "/PhysState";
/// Attribute path of the node run state.
pub const RUN_STATE_PATH: &str = "/RunState";
/// Attribute path of this module's service liveness.
pub const SERVICE_STATE_PATH: &str = "/Services/fleetpower/State";

/// How a mutation request is to be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    /// Execute the named transition.
    Mutate,
    /// Abandon an in-flight transition. Backend calls cannot be cancelled,
    /// so this is a no-op for power control.
    Interrupt,
}

/// An inbound request to execute one transition for one node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationEvent {
    /// Name of the requested transition, matched against the table.
    pub transition: String,
    /// Snapshot of the node being mutated.
    pub node: NodeSnapshot,
    /// Mutate or interrupt.
    pub kind: MutationKind,
}

/// An envelope for events arriving on the inbound fabric channel.
///
/// Only mutation events are meaningful to this module; anything else is a
/// protocol error that is logged and skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FabricEvent {
    /// A mutation request.
    Mutation(MutationEvent),
    /// Any other fabric event type, named for the log line.
    Other(String),
}

/// A strongly-typed observed value, tagged by the attribute path it belongs
/// to.
///
/// The attribute set is fixed and small, so values are a discriminated
/// union looked up through accessors rather than reflective boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObservedValue {
    /// A physical power condition, reported at [`PHYS_STATE_PATH`].
    PhysState(PowerState),
    /// A run state, reported at [`RUN_STATE_PATH`].
    RunState(RunState),
    /// Service liveness, reported at [`SERVICE_STATE_PATH`].
    Service(ServiceState),
}

impl ObservedValue {
    /// The attribute path this value is reported under.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::PhysState(_) => PHYS_STATE_PATH,
            Self::RunState(_) => RUN_STATE_PATH,
            Self::Service(_) => SERVICE_STATE_PATH,
        }
    }

    /// The fabric value token for this observation.
    #[must_use]
    pub const fn value_id(self) -> &'static str {
        match self {
            Self::PhysState(s) => s.as_value_id(),
            Self::RunState(s) => s.as_value_id(),
            Self::Service(s) => s.as_value_id(),
        }
    }
}

/// An asynchronous report of an attribute's actually-observed value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationEvent {
    /// Target attribute URL: node identifier joined with the attribute path.
    pub target: String,
    /// Name of the module that produced the observation.
    pub producer: String,
    /// The observed value.
    pub value: ObservedValue,
    /// When the observation was made.
    pub observed_at: DateTime<Utc>,
}

impl ObservationEvent {
    /// Build an observation event for the given node and value.
    #[must_use]
    pub fn new(node: &NodeId, producer: impl Into<String>, value: ObservedValue) -> Self {
        Self {
            target: node_url_join(node, value.path()),
            producer: producer.into(),
            value,
            observed_at: Utc::now(),
        }
    }

    /// Report an observed physical power state for a node.
    #[must_use]
    pub fn phys_state(node: &NodeId, producer: impl Into<String>, state: PowerState) -> Self {
        Self::new(node, producer, ObservedValue::PhysState(state))
    }

    /// Report this module's own service entry as running.
    #[must_use]
    pub fn service_run(self_node: &NodeId, producer: impl Into<String>) -> Self {
        Self::new(self_node, producer, ObservedValue::Service(ServiceState::Run))
    }
}
