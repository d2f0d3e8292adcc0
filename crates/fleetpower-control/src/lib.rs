//! Node power-lifecycle controller for the fleetpower fabric.
//!
//! This crate reconciles the desired physical power state of managed compute
//! nodes against their actual state. It consumes mutation requests from the
//! fabric, drives an out-of-band power-control backend (`powerman`), and
//! reports observed state back as observation events.
//!
//! # Architecture
//!
//! ```text
//!            fabric                         fabric
//!              │                              ▲
//!   MutationEvent (inbound)        ObservationEvent (outbound)
//!              │                              │
//!              ▼                              │
//! ┌─────────────────────────────────────────────────────────┐
//! │                     PowerController                      │
//! │  ┌──────────────┐ ┌─────────────────┐ ┌──────────────┐  │
//! │  │  Mutation    │ │   Discovery     │ │ Registration │  │
//! │  │  Dispatcher  │ │   Reconciler    │ │   Payload    │  │
//! │  └──────┬───────┘ └──────┬──────────┘ └──────────────┘  │
//! └─────────┼────────────────┼───────────────────────────────┘
//!           ▼                ▼
//!    ┌─────────────┐  ┌──────────────┐
//!    │ PowerBackend│  │ NodeRegistry │
//!    │ (powerman)  │  │  (external)  │
//!    └─────────────┘  └──────────────┘
//! ```
//!
//! The surrounding fabric owns event transport, mutation scheduling and
//! timeout enforcement, and node-record persistence. This crate only
//! declares transition timeouts and the failure sink in its registration
//! payload; it never enforces them. A transition whose backend call produces
//! no observation in time is routed to `HANG` by the external scheduler.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use fleetpower_control::{ControlConfig, PowerController, PowermanBackend};
//! use fleetpower_core::NodeId;
//! use tokio::sync::mpsc;
//!
//! # async fn example() {
//! let (observations_tx, observations_rx) = mpsc::channel(64);
//! let (_mutations_tx, mutations_rx) = mpsc::channel(64);
//!
//! let config = ControlConfig {
//!     allow_list: vec!["n01".to_string(), "n02".to_string()],
//!     ..ControlConfig::default()
//! };
//!
//! let controller = Arc::new(PowerController::new(
//!     Arc::new(PowermanBackend::new()),
//!     config,
//!     NodeId::generate(),
//!     observations_tx,
//! ));
//!
//! // The host fabric drains observations_rx and feeds mutations_rx.
//! controller.run(mutations_rx).await;
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod backend;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod reconciler;
pub mod registration;
pub mod registry;

pub use backend::{parse_query, NoopBackend, PowerBackend, PowermanBackend};
pub use config::ControlConfig;
pub use dispatcher::PowerController;
pub use error::{ControlError, Result};
pub use registration::{DeclaredMutation, ModuleRegistration, MODULE_NAME};
pub use registry::NodeRegistry;

// Re-export commonly used types from the core crate for convenience
pub use fleetpower_core::{
    AdmissionPolicy, FabricEvent, MutationEvent, MutationKind, NodeId, NodeSnapshot,
    ObservationEvent, PowerState, TransitionTable,
};
