//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: `&ServerConfig → Result<(), Vec<ValidationError>>`

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ServerConfig;
use crate::routes::PathTemplate;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    match PathTemplate::parse(&config.routes.prefix) {
        Ok(template) if template.has_wildcard() => {
            errors.push(ValidationError::new("routes.prefix", "must not contain a wildcard"));
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::new("routes.prefix", e.to_string())),
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::new("limits.max_body_bytes", "must be greater than 0"));
    }

    if config.observability.metrics_enabled && config.observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if let Err(e) = Url::parse(&config.client.endpoint) {
        errors.push(ValidationError::new("client.endpoint", e.to_string()));
    }

    if matches!(config.security.api_key.as_deref(), Some(key) if key.trim().is_empty()) {
        errors.push(ValidationError::new("security.api_key", "must not be empty when set"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
