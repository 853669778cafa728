//! Cooldown recovery.
//!
//! After `failure_threshold` consecutive probe failures a node gets one
//! cooldown task. When the delay elapses the node is marked healthy and its
//! error count reset without re-probing it; if it is still down, the next
//! probe or balance attempt marks it unhealthy again.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::lifecycle::ShutdownSignal;
use crate::load_balancer::{NodePool, SelectedNode};
use crate::observability::metrics;

/// Spawn the cooldown task for `target`. Cancelled by `shutdown`.
pub fn schedule(
    pool: Arc<NodePool>,
    target: SelectedNode,
    delay: Duration,
    mut shutdown: ShutdownSignal,
) -> JoinHandle<()> {
    tracing::warn!(
        node = %target.name,
        cooldown_secs = delay.as_secs_f64(),
        "Ethereum node reached failure threshold, cooling down"
    );

    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = shutdown.recv() => {
                tracing::debug!(node = %target.name, "Cooldown cancelled by shutdown");
            }
            _ = tokio::time::sleep(delay) => {
                if let Some(transition) = pool.end_cooldown(target.index) {
                    tracing::warn!(
                        node = %target.name,
                        "Ethereum node cooldown period ended, marking as healthy"
                    );
                    metrics::record_node_health(&target.name, transition.is_healthy());
                }
            }
        }
    })
}
