//! Node health state machine.
//!
//! # States
//! - Healthy: node receives traffic
//! - Unhealthy: node skipped by selection
//!
//! # State Transitions
//! ```text
//! Healthy   → Unhealthy: failed probe, or failed balance attempt
//! Unhealthy → Healthy:   successful probe, or cooldown expiry
//! ```
//!
//! A failed probe that brings `error_count` to the failure threshold also
//! schedules a cooldown, at most one per node at a time. Every mutation
//! happens in a single critical section of the pool lock and reports what
//! it did through the types below.

/// Health flag before/after one mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthTransition {
    BecameHealthy,
    BecameUnhealthy,
    StayedHealthy,
    StayedUnhealthy,
}

impl HealthTransition {
    pub fn between(was_healthy: bool, is_healthy: bool) -> Self {
        match (was_healthy, is_healthy) {
            (false, true) => HealthTransition::BecameHealthy,
            (true, false) => HealthTransition::BecameUnhealthy,
            (true, true) => HealthTransition::StayedHealthy,
            (false, false) => HealthTransition::StayedUnhealthy,
        }
    }

    pub fn changed(self) -> bool {
        matches!(
            self,
            HealthTransition::BecameHealthy | HealthTransition::BecameUnhealthy
        )
    }

    pub fn is_healthy(self) -> bool {
        matches!(
            self,
            HealthTransition::BecameHealthy | HealthTransition::StayedHealthy
        )
    }
}

/// Result of applying a failure (probe or query) to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureOutcome {
    pub transition: HealthTransition,
    pub error_count: u32,
    /// Caller must schedule a cooldown for this node.
    pub cooldown_due: bool,
}
