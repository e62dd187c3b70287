//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let prefix = &config.static_files.prefix;
    if !prefix.starts_with('/') || !prefix.ends_with('/') || prefix.len() < 3 {
        errors.push(ValidationError::new(
            "static_files.prefix",
            "must start and end with '/' and name a segment",
        ));
    }

    if config.app.client_runtime.trim().is_empty() {
        errors.push(ValidationError::new("app.client_runtime", "must not be empty"));
    }

    if config.request.body_limit_bytes == 0 {
        errors.push(ValidationError::new("request.body_limit_bytes", "must be > 0"));
    }
    if config.request.timeout_secs == 0 {
        errors.push(ValidationError::new("request.timeout_secs", "must be > 0"));
    }

    let mut tokens = HashSet::new();
    for (i, entry) in config.auth.tokens.iter().enumerate() {
        if entry.token.is_empty() {
            errors.push(ValidationError::new(
                &format!("auth.tokens[{}].token", i),
                "must not be empty",
            ));
        } else if !tokens.insert(entry.token.as_str()) {
            errors.push(ValidationError::new(
                &format!("auth.tokens[{}].token", i),
                "duplicate token",
            ));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::TokenConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_problem() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.static_files.prefix = "public".into();
        config.request.body_limit_bytes = 0;
        config.auth.tokens = vec![
            TokenConfig {
                token: "t".into(),
                claims: Default::default(),
            },
            TokenConfig {
                token: "t".into(),
                claims: Default::default(),
            },
        ];

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "static_files.prefix",
                "request.body_limit_bytes",
                "auth.tokens[1].token",
            ]
        );
    }
}
