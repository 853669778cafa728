//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Per-node ticker
//!     → web3_clientVersion probe
//!     → NodePool health update (state.rs transitions)
//!     → threshold reached: cooldown.rs
//!
//! Query path (balance.rs):
//!     Failed attempt
//!     → NodePool::mark_failed
//!
//! Cooldown (cooldown.rs):
//!     Fixed delay → node healthy again, error count reset
//! ```
//!
//! # Design Decisions
//! - One task per node so a hung node does not delay the others
//! - Cooldown recovery is optimistic; the next probe corrects it
//! - All tasks stop on the shutdown signal

pub mod active;
pub mod cooldown;
pub mod state;

pub use active::{HealthMonitor, HealthPolicy};
