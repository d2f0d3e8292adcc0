//! Mutation dispatcher.
//!
//! A single long-lived loop consumes mutation requests from the inbound
//! fabric channel and hands each one to a spawned task, so a slow or blocked
//! backend call for one node never delays the next inbound event. In-flight
//! backend calls are capped by a semaphore sized from
//! [`ControlConfig::max_inflight`].

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};

use fleetpower_core::{
    transition, AdmissionPolicy, FabricEvent, MutationEvent, MutationKind, NodeId, NodeSnapshot,
    ObservationEvent, PowerState, TransitionTable,
};

use crate::backend::PowerBackend;
use crate::config::ControlConfig;
use crate::error::{ControlError, Result};
use crate::registration::{ModuleRegistration, MODULE_NAME};

/// The node power-lifecycle controller.
///
/// Holds only read-only configuration and the outbound observation channel;
/// concurrently dispatched tasks share no mutable state.
pub struct PowerController<B: PowerBackend> {
    pub(crate) backend: Arc<B>,
    pub(crate) config: ControlConfig,
    policy: AdmissionPolicy,
    table: TransitionTable,
    self_id: NodeId,
    events: mpsc::Sender<ObservationEvent>,
    permits: Arc<Semaphore>,
}

impl<B: PowerBackend> PowerController<B> {
    /// Create a controller.
    ///
    /// `self_id` is the fabric identity of the node this controller runs on,
    /// used to address its own service-liveness observation.
    #[must_use]
    pub fn new(
        backend: Arc<B>,
        config: ControlConfig,
        self_id: NodeId,
        events: mpsc::Sender<ObservationEvent>,
    ) -> Self {
        let policy = AdmissionPolicy::power_control(&config.platform_path, &config.platform);
        let permits = Arc::new(Semaphore::new(config.max_inflight));
        Self {
            backend,
            config,
            policy,
            table: TransitionTable::power_control(),
            self_id,
            events,
            permits,
        }
    }

    /// The transition table this controller declares.
    #[must_use]
    pub const fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// The admission policy applied to every transition.
    #[must_use]
    pub const fn policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    /// The controller configuration.
    #[must_use]
    pub const fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// Build the startup registration payload for the host fabric.
    #[must_use]
    pub fn registration(&self) -> ModuleRegistration {
        ModuleRegistration::build(&self.table, &self.policy)
    }

    /// Process one mutation request.
    ///
    /// Side-effecting only: emits zero or one observation event downstream
    /// and logs per the error taxonomy. Every failure is fatal to this
    /// invocation alone.
    pub async fn handle(&self, event: MutationEvent) {
        match event.kind {
            // Backend calls cannot be cancelled; nothing to interrupt.
            MutationKind::Interrupt => {}
            MutationKind::Mutate => self.mutate(&event).await,
        }
    }

    async fn mutate(&self, event: &MutationEvent) {
        let node = &event.node;
        let (name, endpoint) = match self.resolve(node) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(node = %node.id, error = %e, "cannot resolve powerman attributes");
                return;
            }
        };

        // Admission is checked before any backend call: platform predicate
        // first, then the allow-list from our own configuration.
        if !self.policy.admits(node) {
            tracing::error!(node = %name, "node fails the admission policy, refusing power control");
            return;
        }
        if !self.config.allows(name) {
            tracing::error!(node = %name, "cannot control power for node not on the allow-list");
            return;
        }

        match event.transition.as_str() {
            // Exists to force a discovery cycle, which the fabric runs itself.
            transition::UK_TO_OFF => {}
            transition::OFF_TO_ON => self.drive(endpoint, name, node.id, PowerState::On).await,
            transition::ON_TO_OFF | transition::HANG_TO_OFF => {
                self.drive(endpoint, name, node.id, PowerState::Off).await;
            }
            other => {
                tracing::debug!(node = %name, transition = other, "no power action for transition");
            }
        }
    }

    /// Resolve the node's powerman name and server endpoint attributes.
    fn resolve<'a>(&self, node: &'a NodeSnapshot) -> Result<(&'a str, &'a str)> {
        let name = node
            .attr(&self.config.name_path)
            .ok_or_else(|| ControlError::AttributeResolution {
                node: node.id.to_string(),
                missing: self.config.name_path.clone(),
            })?;
        let endpoint = node.attr(&self.config.endpoint_path).ok_or_else(|| {
            ControlError::AttributeResolution {
                node: node.id.to_string(),
                missing: self.config.endpoint_path.clone(),
            }
        })?;
        Ok((name, endpoint))
    }

    /// Issue the backend call for a power transition and report the outcome.
    ///
    /// On failure nothing is emitted; the external scheduler's timeout will
    /// eventually route the node to the failure state.
    async fn drive(&self, endpoint: &str, name: &str, id: NodeId, target: PowerState) {
        let outcome = match target {
            PowerState::On => self.backend.power_on(endpoint, name).await,
            _ => self.backend.power_off(endpoint, name).await,
        };
        match outcome {
            Ok(()) => {
                tracing::debug!(node = %name, target = %target, "power command succeeded");
                self.emit_phys_state(id, target).await;
            }
            Err(e) => {
                tracing::error!(node = %name, target = %target, error = %e, "power command failed");
            }
        }
    }

    pub(crate) async fn emit_phys_state(&self, node: NodeId, state: PowerState) {
        self.emit(ObservationEvent::phys_state(&node, MODULE_NAME, state))
            .await;
    }

    pub(crate) async fn emit(&self, event: ObservationEvent) {
        if self.events.send(event).await.is_err() {
            tracing::warn!("observation channel closed, dropping event");
        }
    }
}

impl<B: PowerBackend + 'static> PowerController<B> {
    /// The controller's service entry point: announce liveness, then consume
    /// inbound fabric events until the channel closes.
    ///
    /// Each mutation is dispatched on its own task behind a semaphore
    /// permit, so one slow backend call neither blocks the loop nor lets
    /// bursty traffic spawn unboundedly. Non-mutation events are logged and
    /// skipped; no per-node failure stops the loop.
    pub async fn run(self: Arc<Self>, mut inbound: mpsc::Receiver<FabricEvent>) {
        self.emit(ObservationEvent::service_run(&self.self_id, MODULE_NAME))
            .await;
        tracing::info!(module = MODULE_NAME, "power controller dispatch loop started");

        while let Some(event) = inbound.recv().await {
            match event {
                FabricEvent::Mutation(mutation) => {
                    let Ok(permit) = Arc::clone(&self.permits).acquire_owned().await else {
                        break;
                    };
                    let controller = Arc::clone(&self);
                    tokio::spawn(async move {
                        controller.handle(mutation).await;
                        drop(permit);
                    });
                }
                FabricEvent::Other(kind) => {
                    tracing::error!(kind = %kind, "got unexpected non-mutation event on mutation channel");
                }
            }
        }

        tracing::debug!("mutation channel closed, dispatch loop exiting");
    }
}
