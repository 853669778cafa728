//! Upstream JSON-RPC subsystem.
//!
//! # Data Flow
//! ```text
//! Orchestrator / health monitor
//!     → types.rs (build JSON-RPC 2.0 envelope)
//!     → client.rs (HTTP POST to one node, optional deadline)
//!     → types.rs (decode response envelope)
//!     → Ok(result) | Err(UpstreamError)
//! ```

pub mod client;
pub mod types;

pub use client::UpstreamClient;
pub use types::{RpcErrorObject, RpcRequest, RpcResponse};
