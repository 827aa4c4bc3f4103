//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, concurrency > 0, address parses)
//! - Check security header tokens and raw header names/values
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::header::{HeaderName, HeaderValue};

use crate::config::schema::{SecurityConfig, ServerConfig};

/// Tokens accepted in `Referrer-Policy`.
pub const REFERRER_POLICY_VALUES: &[&str] = &[
    "no-referrer",
    "no-referrer-when-downgrade",
    "origin",
    "origin-when-cross-origin",
    "same-origin",
    "strict-origin",
    "strict-origin-when-cross-origin",
    "unsafe-url",
];

/// Values accepted in `Cross-Origin-Opener-Policy`.
pub const CROSS_ORIGIN_OPENER_POLICY_VALUES: &[&str] =
    &["same-origin", "same-origin-allow-popups", "unsafe-none"];

/// Values accepted in `X-Frame-Options`.
pub const FRAME_OPTIONS_VALUES: &[&str] = &["DENY", "SAMEORIGIN"];

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("listener.max_concurrent_requests must be greater than 0")]
    ZeroConcurrency,

    #[error("listener.tls.{0} must not be empty")]
    EmptyTlsPath(&'static str),

    #[error("timeouts.request_secs must be greater than 0")]
    ZeroRequestTimeout,

    #[error("security.referrer_policy contains unknown token `{0}`")]
    ReferrerPolicy(String),

    #[error("security.cross_origin_opener_policy `{0}` is not a known policy")]
    CrossOriginOpenerPolicy(String),

    #[error("security.frame_options `{0}` must be DENY or SAMEORIGIN")]
    FrameOptions(String),

    #[error("{field}: invalid header name `{name}`")]
    HeaderName { field: &'static str, name: String },

    #[error("{field}: invalid value for header `{name}`")]
    HeaderValue { field: &'static str, name: String },
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.max_concurrent_requests == 0 {
        errors.push(ValidationError::ZeroConcurrency);
    }
    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.trim().is_empty() {
            errors.push(ValidationError::EmptyTlsPath("cert_path"));
        }
        if tls.key_path.trim().is_empty() {
            errors.push(ValidationError::EmptyTlsPath("key_path"));
        }
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    validate_security(&config.security, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_security(security: &SecurityConfig, errors: &mut Vec<ValidationError>) {
    for token in &security.referrer_policy {
        if !REFERRER_POLICY_VALUES.contains(&token.trim()) {
            errors.push(ValidationError::ReferrerPolicy(token.clone()));
        }
    }

    let coop = security.cross_origin_opener_policy.trim();
    if !coop.is_empty() && !CROSS_ORIGIN_OPENER_POLICY_VALUES.contains(&coop) {
        errors.push(ValidationError::CrossOriginOpenerPolicy(coop.to_string()));
    }

    let frame_options = security.frame_options.trim();
    if !frame_options.is_empty() && !FRAME_OPTIONS_VALUES.contains(&frame_options) {
        errors.push(ValidationError::FrameOptions(frame_options.to_string()));
    }

    if let Some(proxy) = &security.proxy_ssl_header {
        check_header(
            "security.proxy_ssl_header",
            &proxy.name,
            &proxy.value,
            errors,
        );
    }
    for extra in &security.extra_headers {
        check_header("security.extra_headers", &extra.name, &extra.value, errors);
    }

    if security.hsts_seconds == 0 && (security.hsts_include_subdomains || security.hsts_preload) {
        tracing::warn!(
            include_subdomains = security.hsts_include_subdomains,
            preload = security.hsts_preload,
            "HSTS options set but security.hsts_seconds is 0; no HSTS header will be sent"
        );
    }
    if security.hsts_preload && !security.hsts_include_subdomains {
        tracing::warn!("HSTS preload lists require includeSubDomains");
    }
}

fn check_header(field: &'static str, name: &str, value: &str, errors: &mut Vec<ValidationError>) {
    if HeaderName::from_bytes(name.as_bytes()).is_err() {
        errors.push(ValidationError::HeaderName {
            field,
            name: name.to_string(),
        });
    }
    if HeaderValue::from_str(value).is_err() {
        errors.push(ValidationError::HeaderValue {
            field,
            name: name.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ExtraHeaderConfig, ProxySslHeader, TlsConfig};

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&ServerConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.listener.max_concurrent_requests = 0;
        config.timeouts.request_secs = 0;
        config.security.referrer_policy = vec!["same-origin".into(), "sometimes".into()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BindAddress("not-an-address".into()),
                ValidationError::ZeroConcurrency,
                ValidationError::ZeroRequestTimeout,
                ValidationError::ReferrerPolicy("sometimes".into()),
            ]
        );
    }

    #[test]
    fn rejects_unknown_policy_values() {
        let mut config = ServerConfig::default();
        config.security.cross_origin_opener_policy = "same-site".into();
        config.security.frame_options = "ALLOW-FROM https://example.com".into();

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::CrossOriginOpenerPolicy(_)));
        assert!(matches!(errors[1], ValidationError::FrameOptions(_)));
    }

    #[test]
    fn empty_values_are_allowed() {
        let mut config = ServerConfig::default();
        config.security.cross_origin_opener_policy = String::new();
        config.security.referrer_policy = Vec::new();
        config.security.frame_options = "SAMEORIGIN".into();

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_invalid_raw_headers() {
        let mut config = ServerConfig::default();
        config.security.proxy_ssl_header = Some(ProxySslHeader {
            name: "X-Forwarded Proto".into(),
            value: "https".into(),
        });
        config.security.extra_headers.push(ExtraHeaderConfig {
            name: "X-Ok".into(),
            value: "bad\r\nvalue".into(),
            secure_only: false,
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            errors[0],
            ValidationError::HeaderName { field: "security.proxy_ssl_header", .. }
        ));
        assert!(matches!(
            errors[1],
            ValidationError::HeaderValue { field: "security.extra_headers", .. }
        ));
    }

    #[test]
    fn rejects_empty_tls_paths() {
        let mut config = ServerConfig::default();
        config.listener.tls = Some(TlsConfig {
            cert_path: "cert.pem".into(),
            key_path: " ".into(),
        });

        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::EmptyTlsPath("key_path")])
        );
    }

    #[test]
    fn hsts_flags_without_max_age_only_warn() {
        let mut config = ServerConfig::default();
        config.security.hsts_include_subdomains = true;
        config.security.hsts_preload = true;

        assert!(validate_config(&config).is_ok());
    }
}
