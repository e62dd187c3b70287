//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::security::auth::SessionData;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Page defaults and client runtime.
    pub app: AppSection,

    /// Reserved static asset prefix.
    pub static_files: StaticFilesConfig,

    /// Request limits.
    pub request: RequestConfig,

    /// Bearer-token session guards.
    pub auth: AuthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppSection {
    /// Default page title.
    pub title: String,

    /// JS global whose `run(actions)` the full page invokes.
    pub client_runtime: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            title: "Trellis".to_string(),
            client_runtime: "window.__trellis".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// URL prefix, with leading and trailing slash.
    pub prefix: String,

    /// Directory served under the prefix.
    pub directory: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            prefix: "/public/".to_string(),
            directory: "public".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Largest body a component may read.
    pub body_limit_bytes: usize,

    /// Whole-request timeout applied by the HTTP layer.
    pub timeout_secs: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            body_limit_bytes: 2 * 1024 * 1024,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    pub tokens: Vec<TokenConfig>,
}

/// A bearer token and the session claims it grants.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    pub token: String,
    #[serde(default)]
    pub claims: SessionData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level or filter directive (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.app.client_runtime, "window.__trellis");
        assert_eq!(config.static_files.prefix, "/public/");
        assert_eq!(config.request.body_limit_bytes, 2 * 1024 * 1024);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert!(config.auth.tokens.is_empty());
    }

    #[test]
    fn test_token_claims_table() {
        let config: AppConfig = toml::from_str(
            r#"
            [app]
            title = "Clinic"

            [[auth.tokens]]
            token = "secret"
            claims = { role = "admin", ward = 3 }

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.app.title, "Clinic");
        assert_eq!(config.app.client_runtime, "window.__trellis");
        assert_eq!(config.auth.tokens[0].token, "secret");
        assert_eq!(config.auth.tokens[0].claims["role"], json!("admin"));
        assert_eq!(config.auth.tokens[0].claims["ward"], json!(3));
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }
}
