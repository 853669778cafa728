//! Active health checking.
//!
//! # Responsibilities
//! - Probe every node on a fixed interval, one independent task per node
//! - Update node health from probe results
//! - Hand nodes that hit the failure threshold to the cooldown task
//!
//! Probes carry no deadline of their own; the shared HTTP client's timeout
//! is the only bound.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::health::cooldown;
use crate::lifecycle::Shutdown;
use crate::load_balancer::{NodePool, SelectedNode};
use crate::observability::metrics;
use crate::upstream::UpstreamClient;

/// Probe timing resolved from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthPolicy {
    pub interval: Duration,
    pub cooldown: Duration,
}

impl From<&HealthCheckConfig> for HealthPolicy {
    fn from(config: &HealthCheckConfig) -> Self {
        Self {
            interval: config.interval(),
            cooldown: config.cooldown(),
        }
    }
}

pub struct HealthMonitor {
    pool: Arc<NodePool>,
    client: UpstreamClient,
    policy: HealthPolicy,
    shutdown: Shutdown,
}

impl HealthMonitor {
    pub fn new(
        pool: Arc<NodePool>,
        client: UpstreamClient,
        policy: HealthPolicy,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            pool,
            client,
            policy,
            shutdown,
        }
    }

    /// Start one probe loop per node. Loops run until shutdown.
    pub fn spawn(self) -> Vec<JoinHandle<()>> {
        let monitor = Arc::new(self);
        let targets = monitor.pool.targets();

        tracing::info!(
            nodes = targets.len(),
            interval_secs = monitor.policy.interval.as_secs_f64(),
            "Ethereum node periodic health check started"
        );

        targets
            .into_iter()
            .map(|target| {
                let monitor = Arc::clone(&monitor);
                tokio::spawn(async move { monitor.run_node(target).await })
            })
            .collect()
    }

    async fn run_node(&self, target: SelectedNode) {
        let mut shutdown = self.shutdown.subscribe();
        // First probe one interval after start, like a plain ticker.
        let mut ticker = time::interval_at(Instant::now() + self.policy.interval, self.policy.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::debug!(node = %target.name, "Health probe received shutdown signal, exiting loop");
                    break;
                }
                _ = async {
                    ticker.tick().await;
                    self.check_node(&target).await;
                } => {}
            }
        }
    }

    /// Probe one node once and apply the result.
    pub async fn check_node(&self, target: &SelectedNode) {
        tracing::debug!(node = %target.name, "Health-checking node");

        match self.client.probe(&target.endpoint).await {
            Ok(()) => {
                if let Some(transition) = self.pool.record_probe_success(target.index) {
                    if transition.changed() {
                        tracing::info!(node = %target.name, "Node is up and running");
                    }
                    metrics::record_node_health(&target.name, transition.is_healthy());
                }
            }
            Err(e) => {
                let Some(outcome) = self.pool.record_probe_failure(target.index) else {
                    return;
                };
                tracing::warn!(
                    node = %target.name,
                    error = %e,
                    error_count = outcome.error_count,
                    "Ethereum node health check failed"
                );
                if outcome.transition.changed() {
                    tracing::warn!(node = %target.name, "Node taken out of rotation");
                }
                metrics::record_node_health(&target.name, outcome.transition.is_healthy());

                if outcome.cooldown_due {
                    cooldown::schedule(
                        Arc::clone(&self.pool),
                        target.clone(),
                        self.policy.cooldown,
                        self.shutdown.subscribe(),
                    );
                }
            }
        }
    }
}
