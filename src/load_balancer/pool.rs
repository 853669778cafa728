//! Node pool management.
//!
//! # Responsibilities
//! - Own every node, the round-robin cursor and the last dispatched name
//! - Own the balance cache
//! - Serialize all of the above behind one mutex
//!
//! No critical section awaits; network I/O always happens with the lock
//! released.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use url::Url;

use crate::cache::ResultCache;
use crate::config::NodeConfig;
use crate::health::state::{FailureOutcome, HealthTransition};
use crate::load_balancer::{
    node::{Node, NodeStatus},
    round_robin::RoundRobin,
    LoadBalancer,
};

#[derive(Debug)]
struct PoolState {
    nodes: Vec<Node>,
    cursor: usize,
    last_dispatched: Option<String>,
    cache: ResultCache,
}

/// Node chosen for one attempt. `index` addresses the node for later
/// health updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedNode {
    pub index: usize,
    pub name: String,
    pub endpoint: Url,
}

/// Owns the nodes and all shared mutable proxy state.
#[derive(Debug)]
pub struct NodePool {
    state: Mutex<PoolState>,
    balancer: Box<dyn LoadBalancer>,
    failure_threshold: u32,
}

impl NodePool {
    /// Create a pool with round-robin selection. Node order is fixed here.
    pub fn new(nodes: Vec<Node>, failure_threshold: u32) -> Self {
        Self::with_balancer(nodes, failure_threshold, Box::new(RoundRobin::new()))
    }

    pub fn with_balancer(
        nodes: Vec<Node>,
        failure_threshold: u32,
        balancer: Box<dyn LoadBalancer>,
    ) -> Self {
        Self {
            state: Mutex::new(PoolState {
                nodes,
                cursor: 0,
                last_dispatched: None,
                cache: ResultCache::new(),
            }),
            balancer,
            failure_threshold: failure_threshold.max(1),
        }
    }

    /// Build from configuration, skipping nodes whose endpoint does not parse.
    pub fn from_config(configs: &[NodeConfig], failure_threshold: u32) -> Self {
        let mut nodes = Vec::with_capacity(configs.len());
        for config in configs {
            match Node::from_config(config) {
                Ok(node) => nodes.push(node),
                Err(e) => {
                    tracing::warn!(node = %config.name, error = %e, "Invalid node endpoint, skipping");
                }
            }
        }
        Self::new(nodes, failure_threshold)
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pick the next healthy node in round-robin order.
    ///
    /// Returns `None` after one full lap when no node is healthy.
    pub fn select_node(&self) -> Option<SelectedNode> {
        let mut state = self.lock();
        let PoolState {
            nodes,
            cursor,
            last_dispatched,
            ..
        } = &mut *state;

        match self.balancer.next_node(nodes, cursor) {
            Some(index) => {
                let node = &mut nodes[index];
                node.last_used = Some(Instant::now());
                *last_dispatched = Some(node.name.clone());
                Some(SelectedNode {
                    index,
                    name: node.name.clone(),
                    endpoint: node.endpoint.clone(),
                })
            }
            None => {
                tracing::warn!(
                    node_count = nodes.len(),
                    "All Ethereum nodes have been checked and none are healthy"
                );
                None
            }
        }
    }

    /// A balance attempt against `index` failed.
    pub fn mark_failed(&self, index: usize) -> Option<HealthTransition> {
        let mut state = self.lock();
        let node = state.nodes.get_mut(index)?;
        let was_healthy = node.healthy;
        node.healthy = false;
        node.error_count = node.error_count.saturating_add(1);
        Some(HealthTransition::between(was_healthy, false))
    }

    /// Probe against `index` succeeded.
    pub fn record_probe_success(&self, index: usize) -> Option<HealthTransition> {
        let mut state = self.lock();
        let node = state.nodes.get_mut(index)?;
        let was_healthy = node.healthy;
        node.healthy = true;
        node.error_count = 0;
        Some(HealthTransition::between(was_healthy, true))
    }

    /// Probe against `index` failed. Reports whether a cooldown must be
    /// scheduled; only one can be pending per node.
    pub fn record_probe_failure(&self, index: usize) -> Option<FailureOutcome> {
        let mut state = self.lock();
        let node = state.nodes.get_mut(index)?;
        let was_healthy = node.healthy;
        node.healthy = false;
        node.error_count = node.error_count.saturating_add(1);

        let cooldown_due = node.error_count >= self.failure_threshold && !node.cooldown_pending;
        if cooldown_due {
            node.cooldown_pending = true;
        }

        Some(FailureOutcome {
            transition: HealthTransition::between(was_healthy, false),
            error_count: node.error_count,
            cooldown_due,
        })
    }

    /// Cooldown for `index` elapsed: put it back into rotation unconditionally.
    pub fn end_cooldown(&self, index: usize) -> Option<HealthTransition> {
        let mut state = self.lock();
        let node = state.nodes.get_mut(index)?;
        let was_healthy = node.healthy;
        node.healthy = true;
        node.error_count = 0;
        node.cooldown_pending = false;
        Some(HealthTransition::between(was_healthy, true))
    }

    /// At least one node is healthy.
    pub fn is_ready(&self) -> bool {
        self.lock().nodes.iter().any(|n| n.healthy)
    }

    pub fn healthy_count(&self) -> usize {
        self.lock().nodes.iter().filter(|n| n.healthy).count()
    }

    /// Name of the most recently dispatched node, empty before the first dispatch.
    pub fn last_dispatched(&self) -> String {
        self.lock().last_dispatched.clone().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.lock().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every node as a dispatch target, in pool order.
    pub fn targets(&self) -> Vec<SelectedNode> {
        self.lock()
            .nodes
            .iter()
            .enumerate()
            .map(|(index, n)| SelectedNode {
                index,
                name: n.name.clone(),
                endpoint: n.endpoint.clone(),
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<NodeStatus> {
        let now = Instant::now();
        self.lock().nodes.iter().map(|n| n.status(now)).collect()
    }

    /// Cached balance for `address` if younger than `ttl`.
    pub fn cached_balance(&self, address: &str, ttl: Duration) -> Option<String> {
        self.lock()
            .cache
            .get_fresh(address, ttl, Instant::now())
            .map(str::to_string)
    }

    pub fn store_balance(&self, address: &str, balance: &str) {
        self.lock().cache.put(address, balance);
    }

    pub fn cache_len(&self) -> usize {
        self.lock().cache.len()
    }
}
