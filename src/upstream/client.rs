//! Single-node JSON-RPC client.
//!
//! # Responsibilities
//! - Build the JSON-RPC envelope and POST it to one node
//! - Enforce the caller's per-attempt deadline
//! - Classify failures (transport, timeout, status, decode, JSON-RPC error)
//!
//! The client never touches node health or the cache; that is the
//! orchestrator's job. The inner `reqwest::Client` is shared by every task.

use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::{UpstreamError, UpstreamResult};
use crate::upstream::types::{RpcRequest, RpcResponse};

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
}

impl UpstreamClient {
    /// Build the shared client. `client_timeout_secs` is the only bound on
    /// calls made without an explicit deadline (health probes).
    pub fn new(config: &UpstreamConfig) -> UpstreamResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.client_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { http })
    }

    /// Send `request` to `endpoint` and return the decoded `result` member.
    ///
    /// With a `deadline`, the in-flight call is dropped once it elapses and
    /// [`UpstreamError::Timeout`] is returned.
    pub async fn call(
        &self,
        endpoint: &Url,
        request: &RpcRequest,
        deadline: Option<Duration>,
    ) -> UpstreamResult<Value> {
        let exchange = self.exchange(endpoint, request);
        match deadline {
            Some(limit) => timeout(limit, exchange)
                .await
                .map_err(|_| UpstreamError::Timeout(limit))?,
            None => exchange.await,
        }
    }

    async fn exchange(&self, endpoint: &Url, request: &RpcRequest) -> UpstreamResult<Value> {
        let response = self
            .http
            .post(endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(transport)?;
        let envelope: RpcResponse =
            serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode(e.to_string()))?;

        if let Some(err) = envelope.error {
            return Err(UpstreamError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        envelope
            .result
            .ok_or_else(|| UpstreamError::Decode("response has neither result nor error".into()))
    }

    /// `eth_getBalance(address, "latest")`. The hex quantity is returned as
    /// the node sent it.
    pub async fn get_balance(
        &self,
        endpoint: &Url,
        address: &str,
        deadline: Duration,
    ) -> UpstreamResult<String> {
        let value = self
            .call(endpoint, &RpcRequest::get_balance(address), Some(deadline))
            .await?;
        match value {
            Value::String(balance) => Ok(balance),
            other => Err(UpstreamError::Decode(format!(
                "expected a hex string result, got {}",
                other
            ))),
        }
    }

    /// Liveness probe via `web3_clientVersion`. Only transport failures and
    /// non-2xx statuses count; the body is not inspected.
    pub async fn probe(&self, endpoint: &Url) -> UpstreamResult<()> {
        let response = self
            .http
            .post(endpoint.clone())
            .json(&RpcRequest::client_version())
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(UpstreamError::Status(status.as_u16()))
        }
    }
}

/// Provider URLs carry API keys; keep them out of error messages.
fn transport(e: reqwest::Error) -> UpstreamError {
    UpstreamError::Transport(e.without_url())
}
