//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Security response header policy.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration. When set, every request counts as secure.
    pub tls: Option<TlsConfig>,

    /// Maximum requests processed concurrently (backpressure).
    pub max_concurrent_requests: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
            max_concurrent_requests: 10_000,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Time allowed for in-flight requests to finish on shutdown.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            shutdown_grace_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security response header configuration.
///
/// Empty strings and empty lists disable the corresponding header.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Master switch for security headers.
    pub enable_headers: bool,

    /// `Strict-Transport-Security` max-age; 0 disables HSTS.
    pub hsts_seconds: u64,

    /// Append `includeSubDomains` to HSTS.
    pub hsts_include_subdomains: bool,

    /// Append `preload` to HSTS.
    pub hsts_preload: bool,

    /// Send `X-Content-Type-Options: nosniff`.
    pub content_type_nosniff: bool,

    /// `Referrer-Policy` tokens, joined with commas.
    pub referrer_policy: Vec<String>,

    /// `Cross-Origin-Opener-Policy` value.
    pub cross_origin_opener_policy: String,

    /// `X-Frame-Options` value (DENY or SAMEORIGIN).
    pub frame_options: String,

    /// Header set by a trusted TLS-terminating proxy.
    pub proxy_ssl_header: Option<ProxySslHeader>,

    /// Additional operator-defined default headers.
    pub extra_headers: Vec<ExtraHeaderConfig>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            hsts_seconds: 0,
            hsts_include_subdomains: false,
            hsts_preload: false,
            content_type_nosniff: true,
            referrer_policy: vec!["same-origin".to_string()],
            cross_origin_opener_policy: "same-origin".to_string(),
            frame_options: String::new(),
            proxy_ssl_header: None,
            extra_headers: Vec::new(),
        }
    }
}

/// A `name: value` pair that marks a request as secure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxySslHeader {
    pub name: String,
    pub value: String,
}

/// An operator-defined default header.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtraHeaderConfig {
    pub name: String,
    pub value: String,

    /// Only propose this header on secure requests.
    #[serde(default)]
    pub secure_only: bool,
}
