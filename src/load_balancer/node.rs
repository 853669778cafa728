//! Upstream node record.
//!
//! # Responsibilities
//! - Represent a single Ethereum node
//! - Track health flag and error count
//! - Produce a serializable status snapshot
//!
//! Nodes are plain data. They are owned by [`NodePool`](super::pool::NodePool)
//! and only mutated while its lock is held.

use serde::Serialize;
use std::time::Instant;
use url::Url;

use crate::config::NodeConfig;

/// A single upstream node.
#[derive(Debug, Clone)]
pub struct Node {
    /// Identity used in logs, metrics and `/nodes`.
    pub name: String,
    /// JSON-RPC endpoint.
    pub endpoint: Url,
    /// Eligible for selection.
    pub healthy: bool,
    /// Last time the node was dispatched to.
    pub last_used: Option<Instant>,
    /// Failures since the last success or cooldown expiry.
    pub error_count: u32,
    /// A cooldown task is scheduled and has not fired yet.
    pub cooldown_pending: bool,
}

impl Node {
    /// Nodes start healthy; probing corrects that within one interval.
    pub fn new(name: impl Into<String>, endpoint: Url) -> Self {
        Self {
            name: name.into(),
            endpoint,
            healthy: true,
            last_used: None,
            error_count: 0,
            cooldown_pending: false,
        }
    }

    pub fn from_config(config: &NodeConfig) -> Result<Self, url::ParseError> {
        Ok(Self::new(config.name.clone(), Url::parse(&config.endpoint)?))
    }

    pub fn status(&self, now: Instant) -> NodeStatus {
        NodeStatus {
            name: self.name.clone(),
            // Provider URLs embed API keys in the path; expose the host only.
            host: self.endpoint.host_str().map(str::to_string),
            healthy: self.healthy,
            error_count: self.error_count,
            cooldown_pending: self.cooldown_pending,
            last_used_ms_ago: self
                .last_used
                .map(|t| now.saturating_duration_since(t).as_millis() as u64),
        }
    }
}

/// Point-in-time view of a node, safe to serve over HTTP.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NodeStatus {
    pub name: String,
    pub host: Option<String>,
    pub healthy: bool,
    pub error_count: u32,
    pub cooldown_pending: bool,
    pub last_used_ms_ago: Option<u64>,
}
