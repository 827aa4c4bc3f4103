//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing response:
//!     → context.rs (was the request secure? TLS, https URI, trusted proxy header)
//!     → policy.rs (config → ordered HeaderProposal list for this context)
//!     → headers.rs (set-if-absent merge into the response HeaderMap)
//!     → Serialized by the HTTP layer
//! ```
//!
//! # Design Decisions
//! - Headers the application already set always take precedence
//! - Policy is pre-parsed once per config load, never per request
//! - Invalid header names or values are rejected at load time

pub mod context;
pub mod headers;
pub mod policy;

use axum::http::header::{InvalidHeaderName, InvalidHeaderValue};

pub use context::{RequestContext, SecureRequestDetector};
pub use headers::{apply, apply_with_report, ApplyReport, HeaderProposal};
pub use policy::{SecurityHeaders, SharedSecurityHeaders};

/// Error raised while turning configured strings into header names/values.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("invalid header name `{name}`")]
    InvalidName {
        name: String,
        #[source]
        source: InvalidHeaderName,
    },

    #[error("invalid value for header `{name}`")]
    InvalidValue {
        name: String,
        #[source]
        source: InvalidHeaderValue,
    },
}
