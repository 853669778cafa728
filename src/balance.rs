//! Balance query orchestration.
//!
//! # Data Flow
//! ```text
//! get_balance(address)
//!     → pool cache (fresh hit → return, no upstream call)
//!     → for attempt in 0..=max_retries:
//!         → select_node (None → NoHealthyNodes, no retry)
//!         → UpstreamClient::get_balance under the per-attempt deadline
//!         → Ok: cache, return
//!         → Err: mark node unhealthy, remember error, next attempt
//!     → RetriesExhausted { retries, last }
//! ```
//!
//! Only successful values are cached. JSON-RPC error objects are handled
//! like transport failures: they consume an attempt and mark the node.

use std::sync::Arc;
use std::time::Duration;

use crate::config::QueryConfig;
use crate::error::QueryError;
use crate::load_balancer::NodePool;
use crate::observability::metrics;
use crate::upstream::UpstreamClient;

/// Query policy resolved once from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    /// Deadline for a single upstream attempt.
    pub attempt_timeout: Duration,
    /// Attempts after the first one.
    pub max_retries: u32,
    /// Maximum age of a cached balance.
    pub cache_ttl: Duration,
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self::from(&QueryConfig::default())
    }
}

impl From<&QueryConfig> for QueryPolicy {
    fn from(config: &QueryConfig) -> Self {
        Self {
            attempt_timeout: config.request_timeout(),
            max_retries: config.max_retries,
            cache_ttl: config.cache_ttl(),
        }
    }
}

/// Public entry point for balance queries.
#[derive(Debug)]
pub struct BalanceService {
    pool: Arc<NodePool>,
    client: UpstreamClient,
    policy: QueryPolicy,
}

impl BalanceService {
    pub fn new(pool: Arc<NodePool>, client: UpstreamClient, policy: QueryPolicy) -> Self {
        Self {
            pool,
            client,
            policy,
        }
    }

    /// Balance of `address` as the node reported it (hex quantity, no conversion).
    pub async fn get_balance(&self, address: &str) -> Result<String, QueryError> {
        if let Some(balance) = self.pool.cached_balance(address, self.policy.cache_ttl) {
            tracing::debug!(address, "Balance served from cache");
            metrics::record_cache_hit();
            metrics::record_balance_request("cache_hit");
            return Ok(balance);
        }

        let mut last_error = None;
        for attempt in 0..=self.policy.max_retries {
            let Some(node) = self.pool.select_node() else {
                tracing::error!(address, attempt, "No healthy Ethereum nodes available");
                metrics::record_balance_request("no_healthy_nodes");
                return Err(QueryError::NoHealthyNodes);
            };
            metrics::record_dispatch(&node.name);

            match self
                .client
                .get_balance(&node.endpoint, address, self.policy.attempt_timeout)
                .await
            {
                Ok(balance) => {
                    tracing::debug!(node = %node.name, address, attempt, "Balance fetched");
                    self.pool.store_balance(address, &balance);
                    metrics::record_balance_request("success");
                    return Ok(balance);
                }
                Err(e) => {
                    tracing::warn!(
                        node = %node.name,
                        address,
                        attempt,
                        kind = e.kind(),
                        error = %e,
                        "Balance attempt failed, marking node unhealthy"
                    );
                    metrics::record_upstream_failure(&node.name, e.kind());
                    if let Some(transition) = self.pool.mark_failed(node.index) {
                        metrics::record_node_health(&node.name, transition.is_healthy());
                    }
                    last_error = Some(e);
                }
            }
        }

        metrics::record_balance_request("retries_exhausted");
        match last_error {
            Some(last) => {
                tracing::error!(
                    address,
                    retries = self.policy.max_retries,
                    error = %last,
                    "Balance query exhausted retries"
                );
                Err(QueryError::RetriesExhausted {
                    retries: self.policy.max_retries,
                    last,
                })
            }
            None => Err(QueryError::NoHealthyNodes),
        }
    }

    /// At least one node is healthy.
    pub fn is_ready(&self) -> bool {
        self.pool.is_ready()
    }

    /// Most recently dispatched node name (best effort under concurrency).
    pub fn node_name(&self) -> String {
        self.pool.last_dispatched()
    }

    pub fn pool(&self) -> &Arc<NodePool> {
        &self.pool
    }

    pub fn policy(&self) -> QueryPolicy {
        self.policy
    }
}
