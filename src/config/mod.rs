//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional .env file (outside production, never overrides the process env)
//! optional config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides, default fallback)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → resolved into QueryPolicy / HealthPolicy and handed to subsystems
//! ```
//!
//! # Design Decisions
//! - Config is resolved once at startup; nothing re-reads the environment per request
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_dotenv, ConfigError};
pub use schema::{
    HealthCheckConfig, ListenerConfig, NodeConfig, ObservabilityConfig, ProxyConfig, QueryConfig,
    UpstreamConfig,
};
