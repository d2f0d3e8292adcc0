//! Discovery reconciler.
//!
//! Periodically (or on demand) polls the real power state of every node the
//! fabric knows about and emits an observation event per successful query.
//! The sweep's cost is proportional to fleet size, which is accepted for
//! the modest fleets this controller targets.

use std::collections::BTreeMap;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::MissedTickBehavior;

use fleetpower_core::NodeId;

use crate::backend::PowerBackend;
use crate::dispatcher::PowerController;
use crate::error::Result;
use crate::registry::NodeRegistry;

impl<B: PowerBackend> PowerController<B> {
    /// Sweep the whole registry once and report observed power states.
    ///
    /// Nodes missing the platform, name, or endpoint attribute, or whose
    /// platform does not match the configured one, are skipped with a debug
    /// log. Admissible nodes are grouped by backend endpoint; groups are
    /// queried concurrently, nodes within a group sequentially, so one hung
    /// endpoint cannot stall the rest of the sweep. A query error for one
    /// node is logged and skipped without affecting the others.
    ///
    /// Returns the number of observation events emitted.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Registry` only when the registry snapshot
    /// itself cannot be fetched; per-node failures are not errors.
    pub async fn reconcile_all<R>(&self, registry: &R) -> Result<usize>
    where
        R: NodeRegistry + ?Sized,
    {
        tracing::debug!("polling for node power state");
        let nodes = registry.snapshot().await?;

        // BTreeMap keeps endpoint iteration deterministic.
        let mut by_endpoint: BTreeMap<String, Vec<(String, NodeId)>> = BTreeMap::new();
        for node in nodes {
            let attrs = [
                node.attr(&self.config.platform_path),
                node.attr(&self.config.name_path),
                node.attr(&self.config.endpoint_path),
            ];
            let [Some(platform), Some(name), Some(endpoint)] = attrs else {
                tracing::debug!(node = %node.id, "skipping node without complete powerman info");
                continue;
            };
            if platform != self.config.platform {
                continue;
            }
            by_endpoint
                .entry(endpoint.to_string())
                .or_default()
                .push((name.to_string(), node.id));
        }

        let sweeps = by_endpoint.into_iter().map(|(endpoint, members)| async move {
            let mut emitted = 0_usize;
            for (name, id) in members {
                match self.backend.query_state(&endpoint, &name).await {
                    Ok(state) => {
                        self.emit_phys_state(id, state).await;
                        emitted += 1;
                    }
                    Err(e) => {
                        tracing::debug!(
                            node = %name,
                            endpoint = %endpoint,
                            error = %e,
                            "power state query failed"
                        );
                    }
                }
            }
            emitted
        });

        Ok(join_all(sweeps).await.into_iter().sum())
    }

    /// Drive [`Self::reconcile_all`] on a fixed interval, forever.
    ///
    /// A failed sweep is logged and the next tick proceeds; overlapping
    /// sweeps cannot occur because each one completes before the next tick
    /// is awaited.
    pub async fn run_sweeper<R>(&self, registry: &R, interval: Duration)
    where
        R: NodeRegistry + ?Sized,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.reconcile_all(registry).await {
                Ok(emitted) => {
                    tracing::debug!(emitted, "discovery sweep complete");
                }
                Err(e) => {
                    tracing::error!(error = %e, "node registry poll failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::sync::mpsc;

    use fleetpower_core::{NodeSnapshot, ObservationEvent, PowerState};

    use crate::config::ControlConfig;
    use crate::error::ControlError;

    /// Registry stub over a fixed node list.
    struct InMemoryRegistry {
        nodes: Vec<NodeSnapshot>,
    }

    #[async_trait]
    impl NodeRegistry for InMemoryRegistry {
        async fn snapshot(&self) -> Result<Vec<NodeSnapshot>> {
            Ok(self.nodes.clone())
        }
    }

    struct FailingRegistry;

    #[async_trait]
    impl NodeRegistry for FailingRegistry {
        async fn snapshot(&self) -> Result<Vec<NodeSnapshot>> {
            Err(ControlError::Registry("registry unavailable".to_string()))
        }
    }

    /// Backend whose queries report ON, except nodes named in `broken`.
    #[derive(Default)]
    struct QueryBackend {
        broken: Vec<String>,
        queried: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl PowerBackend for QueryBackend {
        async fn power_on(&self, _endpoint: &str, _node: &str) -> Result<()> {
            Ok(())
        }

        async fn power_off(&self, _endpoint: &str, _node: &str) -> Result<()> {
            Ok(())
        }

        async fn query_state(&self, endpoint: &str, node: &str) -> Result<PowerState> {
            self.queried
                .lock()
                .push((endpoint.to_string(), node.to_string()));
            if self.broken.iter().any(|b| b == node) {
                return Err(ControlError::QueryParse {
                    node: node.to_string(),
                    reason: "node not present in any membership line".to_string(),
                });
            }
            Ok(PowerState::On)
        }
    }

    fn managed(name: &str, endpoint: &str) -> NodeSnapshot {
        NodeSnapshot::new(fleetpower_core::NodeId::generate())
            .with_attr("/Platform", "powerman")
            .with_attr("/Powerman/Name", name)
            .with_attr("/Powerman/Server", endpoint)
    }

    fn setup(
        backend: QueryBackend,
    ) -> (
        Arc<PowerController<QueryBackend>>,
        mpsc::Receiver<ObservationEvent>,
        Arc<QueryBackend>,
    ) {
        let backend = Arc::new(backend);
        let (tx, rx) = mpsc::channel(64);
        let controller = Arc::new(PowerController::new(
            Arc::clone(&backend),
            ControlConfig::default(),
            fleetpower_core::NodeId::generate(),
            tx,
        ));
        (controller, rx, backend)
    }

    #[tokio::test]
    async fn emits_one_event_per_admissible_node() {
        let registry = InMemoryRegistry {
            nodes: vec![
                managed("n01", "pm0:10101"),
                managed("n02", "pm0:10101"),
                managed("n03", "pm1:10101"),
                // Wrong platform: skipped.
                managed("v01", "pm0:10101").with_attr("/Platform", "vbox"),
                // Missing endpoint attribute: skipped.
                NodeSnapshot::new(fleetpower_core::NodeId::generate())
                    .with_attr("/Platform", "powerman")
                    .with_attr("/Powerman/Name", "n04"),
            ],
        };
        let (controller, mut rx, backend) = setup(QueryBackend::default());

        let emitted = controller.reconcile_all(&registry).await.unwrap();

        assert_eq!(emitted, 3);
        assert_eq!(backend.queried.lock().len(), 3);
        for _ in 0..3 {
            let event = rx.recv().await.unwrap();
            assert_eq!(event.value.value_id(), "ON");
            assert_eq!(event.value.path(), "/PhysState");
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn query_error_skips_node_but_not_sweep() {
        let registry = InMemoryRegistry {
            nodes: vec![managed("n01", "pm0:10101"), managed("n02", "pm0:10101")],
        };
        let (controller, mut rx, backend) = setup(QueryBackend {
            broken: vec!["n01".to_string()],
            ..QueryBackend::default()
        });

        let emitted = controller.reconcile_all(&registry).await.unwrap();

        // Both nodes are queried, only the healthy one produces an event.
        assert_eq!(backend.queried.lock().len(), 2);
        assert_eq!(emitted, 1);
        let event = rx.recv().await.unwrap();
        assert!(event.target.ends_with("/PhysState"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn nodes_are_grouped_by_endpoint() {
        let registry = InMemoryRegistry {
            nodes: vec![
                managed("n01", "pm1:10101"),
                managed("n02", "pm0:10101"),
                managed("n03", "pm1:10101"),
            ],
        };
        let (controller, _rx, backend) = setup(QueryBackend::default());

        controller.reconcile_all(&registry).await.unwrap();

        let queried = backend.queried.lock();
        let pm1: Vec<&str> = queried
            .iter()
            .filter(|(e, _)| e == "pm1:10101")
            .map(|(_, n)| n.as_str())
            .collect();
        // Within one endpoint group, nodes are queried sequentially in order.
        assert_eq!(pm1, vec!["n01", "n03"]);
    }

    #[tokio::test]
    async fn empty_registry_emits_nothing() {
        let registry = InMemoryRegistry { nodes: vec![] };
        let (controller, mut rx, _backend) = setup(QueryBackend::default());

        let emitted = controller.reconcile_all(&registry).await.unwrap();
        assert_eq!(emitted, 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn registry_failure_propagates() {
        let (controller, mut rx, _backend) = setup(QueryBackend::default());

        let result = controller.reconcile_all(&FailingRegistry).await;
        assert!(matches!(result, Err(ControlError::Registry(_))));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_ticks_repeatedly() {
        let registry = Arc::new(InMemoryRegistry {
            nodes: vec![managed("n01", "pm0:10101")],
        });
        let (controller, mut rx, _backend) = setup(QueryBackend::default());

        let sweeper_registry = Arc::clone(&registry);
        tokio::spawn(async move {
            controller
                .run_sweeper(&*sweeper_registry, Duration::from_secs(60))
                .await;
        });

        // First tick fires immediately, the second after the interval.
        let first = rx.recv().await.unwrap();
        assert_eq!(first.value.value_id(), "ON");
        let second = rx.recv().await.unwrap();
        assert_eq!(second.value.value_id(), "ON");
    }
}
