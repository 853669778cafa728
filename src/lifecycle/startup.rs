//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the node pool, shared client and balance service from config
//! - Start background probing
//! - Serve HTTP and tear everything down on shutdown
//!
//! Any startup error is fatal; listeners start last.

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::balance::{BalanceService, QueryPolicy};
use crate::config::ProxyConfig;
use crate::error::UpstreamError;
use crate::health::{HealthMonitor, HealthPolicy};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::load_balancer::NodePool;
use crate::upstream::UpstreamClient;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build upstream HTTP client: {0}")]
    Client(#[source] UpstreamError),

    #[error("no usable Ethereum nodes configured")]
    NoNodes,

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fully wired proxy, not yet serving.
pub struct Proxy {
    config: ProxyConfig,
    client: UpstreamClient,
    service: Arc<BalanceService>,
    shutdown: Shutdown,
}

impl Proxy {
    pub fn new(config: ProxyConfig) -> Result<Self, StartupError> {
        let client = UpstreamClient::new(&config.upstream).map_err(StartupError::Client)?;

        let pool = Arc::new(NodePool::from_config(
            &config.nodes,
            config.health_check.failure_threshold,
        ));
        if pool.is_empty() {
            return Err(StartupError::NoNodes);
        }

        let nodes = pool.len();
        let service = Arc::new(BalanceService::new(
            pool,
            client.clone(),
            QueryPolicy::from(&config.query),
        ));

        let policy = service.policy();
        tracing::info!(
            nodes,
            attempt_timeout_secs = policy.attempt_timeout.as_secs(),
            max_retries = policy.max_retries,
            cache_ttl_secs = policy.cache_ttl.as_secs(),
            "Balance service configured"
        );

        Ok(Self {
            config,
            client,
            service,
            shutdown: Shutdown::new(),
        })
    }

    pub fn service(&self) -> Arc<BalanceService> {
        Arc::clone(&self.service)
    }

    /// Handle for triggering shutdown from outside (signals, tests).
    pub fn shutdown(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Start per-node probe loops, if enabled.
    pub fn spawn_health_checks(&self) -> Vec<JoinHandle<()>> {
        if !self.config.health_check.enabled {
            tracing::info!("Active health checks disabled");
            return Vec::new();
        }
        HealthMonitor::new(
            Arc::clone(self.service.pool()),
            self.client.clone(),
            HealthPolicy::from(&self.config.health_check),
            self.shutdown.clone(),
        )
        .spawn()
    }

    /// Probe nodes and serve HTTP on `listener` until shutdown.
    pub async fn run(
        self,
        listener: TcpListener,
        metrics: Option<PrometheusHandle>,
    ) -> Result<(), StartupError> {
        let probes = self.spawn_health_checks();
        let server = HttpServer::new(self.service(), metrics);

        let result = server.run(listener, self.shutdown.subscribe()).await;

        // Server may also stop on its own error; background tasks follow it down.
        if !self.shutdown.is_triggered() {
            tracing::warn!("HTTP server stopped before shutdown was requested");
        }
        self.shutdown.trigger();
        for probe in probes {
            let _ = probe.await;
        }

        result.map_err(StartupError::from)
    }
}
