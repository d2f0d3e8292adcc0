//! Core types for the fleetpower node power-lifecycle controller.
//!
//! This crate provides the foundational types shared by the controller and
//! its host fabric:
//!
//! - **Power states**: the physical power condition of a node, plus the
//!   run-state and service-liveness enumerations published at registration
//! - **Transition table**: the fixed, named power-state transitions with
//!   per-transition timeouts and the universal failure sink
//! - **Admission policy**: require/exclude predicates over node attributes
//! - **Node snapshots**: read-only views of registry records, addressed by
//!   attribute path
//! - **Events**: inbound mutation requests and outbound observation events
//!
//! Everything here is plain data. The controller logic that consumes these
//! types lives in `fleetpower-control`.
//!
//! # Example
//!
//! ```
//! use fleetpower_core::{PowerState, TransitionTable};
//!
//! let table = TransitionTable::power_control();
//! table.validate().unwrap();
//!
//! let t = table.get("OFFtoON").unwrap();
//! assert_eq!(t.from, PowerState::Off);
//! assert_eq!(t.to, PowerState::On);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod event;
pub mod node;
pub mod policy;
pub mod state;
pub mod transition;

pub use error::{CoreError, Result};
pub use event::{
    FabricEvent, MutationEvent, MutationKind, ObservationEvent, ObservedValue, PHYS_STATE_PATH,
    RUN_STATE_PATH, SERVICE_STATE_PATH,
};
pub use node::{node_url_join, NodeId, NodeSnapshot};
pub use policy::AdmissionPolicy;
pub use state::{PowerState, RunState, ServiceState};
pub use transition::{Transition, TransitionTable};
