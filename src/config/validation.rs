//! Configuration validation.
//!
//! Serde handles syntax; this module checks what serde cannot: node list
//! integrity, endpoint URLs and value ranges. Every problem is reported, not
//! just the first one.

use std::collections::HashSet;
use std::fmt;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.nodes.is_empty() {
        errors.push(ValidationError::new("nodes", "at least one node is required"));
    }

    let mut seen = HashSet::new();
    for (i, node) in config.nodes.iter().enumerate() {
        let field = format!("nodes[{}]", i);
        if node.name.trim().is_empty() {
            errors.push(ValidationError::new(format!("{}.name", field), "must not be empty"));
        } else if !seen.insert(node.name.as_str()) {
            errors.push(ValidationError::new(
                format!("{}.name", field),
                format!("duplicate node name '{}'", node.name),
            ));
        }

        match Url::parse(&node.endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::new(
                format!("{}.endpoint", field),
                format!("unsupported scheme '{}'", url.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new(
                format!("{}.endpoint", field),
                format!("invalid URL '{}': {}", node.endpoint, e),
            )),
        }
    }

    if config.query.request_timeout_secs == 0 {
        errors.push(ValidationError::new("query.request_timeout_secs", "must be greater than 0"));
    }
    if config.query.cache_ttl_secs == 0 {
        errors.push(ValidationError::new("query.cache_ttl_secs", "must be greater than 0"));
    }

    let health = &config.health_check;
    if health.interval_secs == 0 {
        errors.push(ValidationError::new("health_check.interval_secs", "must be greater than 0"));
    }
    if health.failure_threshold == 0 {
        errors.push(ValidationError::new("health_check.failure_threshold", "must be greater than 0"));
    }
    if health.cooldown_secs == 0 {
        errors.push(ValidationError::new("health_check.cooldown_secs", "must be greater than 0"));
    }

    if config.upstream.client_timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.client_timeout_secs", "must be greater than 0"));
    }

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("invalid socket address '{}'", config.listener.bind_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
