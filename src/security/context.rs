//! Per-request security context.

use axum::http::{
    header::{HeaderMap, HeaderName, HeaderValue},
    uri::Scheme,
    Uri,
};

/// Facts about the request that decide which proposals apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// The request reached us over a secure channel.
    pub is_secure: bool,
}

impl RequestContext {
    pub fn secure() -> Self {
        Self { is_secure: true }
    }

    pub fn insecure() -> Self {
        Self { is_secure: false }
    }
}

/// Decides whether a request arrived over a secure channel.
///
/// A request is secure when the listener terminates TLS, when its URI
/// carries the `https` scheme, or when a trusted proxy header is present
/// with exactly the configured value.
#[derive(Debug, Clone, Default)]
pub struct SecureRequestDetector {
    tls_terminated: bool,
    proxy_header: Option<(HeaderName, HeaderValue)>,
}

impl SecureRequestDetector {
    pub fn new(tls_terminated: bool) -> Self {
        Self {
            tls_terminated,
            proxy_header: None,
        }
    }

    /// Trust `name: value` set by a fronting proxy as proof of HTTPS.
    pub fn with_proxy_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.proxy_header = Some((name, value));
        self
    }

    pub fn is_secure(&self, uri: &Uri, headers: &HeaderMap) -> bool {
        if self.tls_terminated || uri.scheme() == Some(&Scheme::HTTPS) {
            return true;
        }

        match &self.proxy_header {
            Some((name, expected)) => headers.get(name) == Some(expected),
            None => false,
        }
    }

    pub fn context_for(&self, uri: &Uri, headers: &HeaderMap) -> RequestContext {
        RequestContext {
            is_secure: self.is_secure(uri, headers),
        }
    }
}
