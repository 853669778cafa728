//! Error types for the balance proxy.
//!
//! Three layers of failure are kept apart:
//! - [`UpstreamError`]: a single call against a single node failed.
//! - [`QueryError`]: the orchestrator gave up on a balance query.
//! - [`ConfigError`](crate::config::loader::ConfigError): startup configuration is unusable.

use std::time::Duration;
use thiserror::Error;

/// Failure of one JSON-RPC call against one node.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection refused, reset, DNS failure, client-level timeout.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Per-attempt deadline elapsed before the node answered.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Node answered with an HTTP status other than 200.
    #[error("unexpected status code: {0}")]
    Status(u16),

    /// Body was not a usable JSON-RPC response envelope.
    #[error("invalid JSON-RPC response: {0}")]
    Decode(String),

    /// Node returned a JSON-RPC error object.
    #[error("error response from node: {message}")]
    Rpc { code: i64, message: String },
}

impl UpstreamError {
    /// Short label for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::Status(_) => "status",
            UpstreamError::Decode(_) => "decode",
            UpstreamError::Rpc { .. } => "rpc",
        }
    }
}

/// Terminal outcome of a balance query that did not produce a value.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Selection found no healthy node. Nothing was retried.
    #[error("no healthy Ethereum nodes available to fetch the balance")]
    NoHealthyNodes,

    /// Every attempt failed.
    #[error("failed to fetch balance after {retries} retries, last error: {last}")]
    RetriesExhausted {
        retries: u32,
        #[source]
        last: UpstreamError,
    },
}

/// Result alias for single-node calls.
pub type UpstreamResult<T> = Result<T, UpstreamError>;
