//! Load-balancing proxy for Ethereum balance queries.
//!
//! Fronts a pool of JSON-RPC nodes: round-robin selection over healthy
//! nodes, background health probing with cooldown recovery, per-request
//! failover and a short-lived balance cache.

pub mod balance;
pub mod cache;
pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod upstream;

pub use balance::{BalanceService, QueryPolicy};
pub use config::schema::ProxyConfig;
pub use error::{QueryError, UpstreamError};
pub use http::HttpServer;
pub use lifecycle::{startup::Proxy, Shutdown};
