//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing)
//! - Translate query outcomes to status codes and JSON bodies
//! - Serve until the shutdown signal fires

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::balance::BalanceService;
use crate::error::QueryError;
use crate::http::address::is_valid_address;
use crate::http::request::UuidRequestId;
use crate::lifecycle::ShutdownSignal;
use crate::load_balancer::NodeStatus;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BalanceService>,
    pub metrics: Option<PrometheusHandle>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct NodesResponse {
    pub last_dispatched: String,
    pub healthy: usize,
    pub nodes: Vec<NodeStatus>,
}

/// HTTP front end for the balance service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(service: Arc<BalanceService>, metrics: Option<PrometheusHandle>) -> Self {
        let router = Self::build_router(AppState { service, metrics });
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/eth/balance/{address}", get(balance_handler))
            .route("/eth/balance/", get(missing_address_handler))
            .route("/healthz", get(healthz_handler))
            .route("/ready", get(ready_handler))
            .route("/nodes", get(nodes_handler))
            .route("/metrics", get(metrics_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    pub async fn run(self, listener: TcpListener, mut shutdown: ShutdownSignal) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining HTTP server");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

async fn balance_handler(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Response {
    if !is_valid_address(&address) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid or missing Ethereum address");
    }

    match state.service.get_balance(&address).await {
        Ok(balance) => (StatusCode::OK, Json(BalanceResponse { balance })).into_response(),
        Err(e @ QueryError::NoHealthyNodes) => {
            tracing::error!(address = %address, error = %e, "Error fetching balance");
            error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
        Err(e @ QueryError::RetriesExhausted { .. }) => {
            tracing::error!(address = %address, error = %e, "Error fetching balance");
            // The upstream cause can name provider endpoints; keep it in the logs.
            error_response(StatusCode::BAD_GATEWAY, "Failed to fetch balance from upstream nodes")
        }
    }
}

async fn missing_address_handler() -> Response {
    error_response(StatusCode::BAD_REQUEST, "Invalid or missing Ethereum address")
}

async fn healthz_handler() -> StatusCode {
    StatusCode::OK
}

async fn ready_handler(State(state): State<AppState>) -> Response {
    if state.service.is_ready() {
        StatusCode::OK.into_response()
    } else {
        tracing::warn!("Service not ready: no healthy Ethereum nodes");
        (StatusCode::SERVICE_UNAVAILABLE, "Service Not ready").into_response()
    }
}

async fn nodes_handler(State(state): State<AppState>) -> Json<NodesResponse> {
    Json(NodesResponse {
        last_dispatched: state.service.node_name(),
        healthy: state.service.pool().healthy_count(),
        nodes: state.service.pool().statuses(),
    })
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
