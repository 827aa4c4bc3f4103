//! Non-destructive security response headers for axum services.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ listener (TCP / TLS) ──▶ request id, tracing, limits
//!                                                       │
//!                                                       ▼
//!                                       security middleware (capture context)
//!                                                       │
//!                                                       ▼
//!                                                   handler
//!                                                       │
//!     Client Response                                   ▼
//!     ◀────────────── security middleware: policy → proposals → set-if-absent
//!
//!     Cross-cutting: config (+ hot reload), observability, lifecycle
//! ```
//!
//! The core operation is [`security::apply`]: every applicable
//! [`security::HeaderProposal`] is written into the response's header map
//! only when no header of that name is present already.

// Core
pub mod http;
pub mod security;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use security::{apply, apply_with_report, ApplyReport, HeaderProposal, SecurityHeaders};
