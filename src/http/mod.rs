//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, request ID, trace span)
//!     → address.rs (reject malformed addresses with 400)
//!     → BalanceService::get_balance
//!     → JSON response {"balance": ...} or {"error": ...}
//! ```

pub mod address;
pub mod request;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
