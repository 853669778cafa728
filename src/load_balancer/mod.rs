//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Balance query
//!     → pool.rs (lock shared state)
//!     → round_robin.rs (scan from cursor, skip unhealthy nodes)
//!     → node.rs (stamp last_used, remember dispatched name)
//!     → SelectedNode or None
//! ```
//!
//! # Design Decisions
//! - The strategy is stateless; the pool owns cursor and health
//! - One mutex guards nodes, cursor, last dispatched name and the cache
//! - Unhealthy nodes excluded from selection
//! - No weighting by latency or error count

pub mod node;
pub mod pool;
pub mod round_robin;

use std::fmt::Debug;

/// Node selection strategy.
pub trait LoadBalancer: Send + Sync + Debug {
    /// Choose a node starting at `cursor`, scanning at most `nodes.len()`
    /// entries. On success the cursor is advanced past the chosen index.
    fn next_node(&self, nodes: &[Node], cursor: &mut usize) -> Option<usize>;
}

pub use node::{Node, NodeStatus};
pub use pool::{NodePool, SelectedNode};
pub use round_robin::RoundRobin;
