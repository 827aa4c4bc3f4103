//! Security header policy.
//!
//! Turns the `[security]` config table into pre-parsed header values and
//! produces the ordered proposal list for each response.

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::http::header::{
    HeaderMap, HeaderName, HeaderValue, REFERRER_POLICY, STRICT_TRANSPORT_SECURITY,
    X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
};
use axum::http::Uri;

use crate::config::schema::SecurityConfig;
use crate::security::context::{RequestContext, SecureRequestDetector};
use crate::security::headers::HeaderProposal;
use crate::security::PolicyError;

/// `Cross-Origin-Opener-Policy` has no constant in `http`.
pub const CROSS_ORIGIN_OPENER_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-opener-policy");

/// Policy shared with the middleware; swapped atomically on config reload.
pub type SharedSecurityHeaders = Arc<ArcSwap<SecurityHeaders>>;

#[derive(Debug, Clone)]
struct ExtraHeader {
    name: HeaderName,
    value: HeaderValue,
    secure_only: bool,
}

/// Pre-parsed security header policy.
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    enabled: bool,
    hsts: Option<HeaderValue>,
    nosniff: bool,
    referrer_policy: Option<HeaderValue>,
    cross_origin_opener_policy: Option<HeaderValue>,
    frame_options: Option<HeaderValue>,
    extra: Vec<ExtraHeader>,
    detector: SecureRequestDetector,
}

impl SecurityHeaders {
    /// Build the policy from config. `tls_terminated` marks every request secure.
    pub fn from_config(config: &SecurityConfig, tls_terminated: bool) -> Result<Self, PolicyError> {
        let hsts = if config.hsts_seconds > 0 {
            let value = hsts_value(
                config.hsts_seconds,
                config.hsts_include_subdomains,
                config.hsts_preload,
            );
            Some(parse_value(STRICT_TRANSPORT_SECURITY.as_str(), &value)?)
        } else {
            None
        };

        let referrer_policy = if config.referrer_policy.is_empty() {
            None
        } else {
            let joined = config
                .referrer_policy
                .iter()
                .map(|token| token.trim())
                .collect::<Vec<_>>()
                .join(",");
            Some(parse_value(REFERRER_POLICY.as_str(), &joined)?)
        };

        let cross_origin_opener_policy = optional_value(
            CROSS_ORIGIN_OPENER_POLICY.as_str(),
            &config.cross_origin_opener_policy,
        )?;
        let frame_options = optional_value(X_FRAME_OPTIONS.as_str(), &config.frame_options)?;

        let extra = config
            .extra_headers
            .iter()
            .map(|header| -> Result<ExtraHeader, PolicyError> {
                let proposal = HeaderProposal::parse(&header.name, &header.value, true)?;
                Ok(ExtraHeader {
                    name: proposal.name,
                    value: proposal.value,
                    secure_only: header.secure_only,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut detector = SecureRequestDetector::new(tls_terminated);
        if let Some(proxy) = &config.proxy_ssl_header {
            let trusted = HeaderProposal::parse(&proxy.name, &proxy.value, true)?;
            detector = detector.with_proxy_header(trusted.name, trusted.value);
        }

        Ok(Self {
            enabled: config.enable_headers,
            hsts,
            nosniff: config.content_type_nosniff,
            referrer_policy,
            cross_origin_opener_policy,
            frame_options,
            extra,
            detector,
        })
    }

    /// Wrap the policy for sharing with the middleware.
    pub fn into_shared(self) -> SharedSecurityHeaders {
        Arc::new(ArcSwap::from_pointee(self))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn context_for(&self, uri: &Uri, headers: &HeaderMap) -> RequestContext {
        self.detector.context_for(uri, headers)
    }

    /// Ordered proposals for a response produced under `context`.
    ///
    /// Order: HSTS, nosniff, Referrer-Policy, COOP, X-Frame-Options, extras.
    pub fn proposals(&self, context: &RequestContext) -> Vec<HeaderProposal> {
        let mut proposals = Vec::with_capacity(5 + self.extra.len());

        if let Some(hsts) = &self.hsts {
            proposals.push(
                HeaderProposal::new(STRICT_TRANSPORT_SECURITY, hsts.clone())
                    .when(self.enabled && context.is_secure),
            );
        }

        if self.nosniff {
            proposals.push(
                HeaderProposal::new(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"))
                    .when(self.enabled),
            );
        }

        let plain = [
            (REFERRER_POLICY, &self.referrer_policy),
            (CROSS_ORIGIN_OPENER_POLICY, &self.cross_origin_opener_policy),
            (X_FRAME_OPTIONS, &self.frame_options),
        ];
        for (name, value) in plain {
            if let Some(value) = value {
                proposals.push(HeaderProposal::new(name, value.clone()).when(self.enabled));
            }
        }

        for header in &self.extra {
            proposals.push(
                HeaderProposal::new(header.name.clone(), header.value.clone())
                    .when(self.enabled && (!header.secure_only || context.is_secure)),
            );
        }

        proposals
    }
}

/// `max-age=N[; includeSubDomains][; preload]`
pub fn hsts_value(seconds: u64, include_subdomains: bool, preload: bool) -> String {
    let mut value = format!("max-age={seconds}");
    if include_subdomains {
        value.push_str("; includeSubDomains");
    }
    if preload {
        value.push_str("; preload");
    }
    value
}

fn parse_value(name: &str, value: &str) -> Result<HeaderValue, PolicyError> {
    HeaderValue::from_str(value).map_err(|source| PolicyError::InvalidValue {
        name: name.to_string(),
        source,
    })
}

// Empty string disables the header.
fn optional_value(name: &str, value: &str) -> Result<Option<HeaderValue>, PolicyError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    parse_value(name, value).map(Some)
}
