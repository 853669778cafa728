//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout (JSON lines)
//!     → GET /metrics (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`node`, `attempt`, `error`) instead of formatted strings
//! - Request ID generated per HTTP request and carried in the trace span
//! - Metrics are cheap and no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
