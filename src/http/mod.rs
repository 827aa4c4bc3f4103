//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, concurrency limit, request ID, tracing)
//!     → middleware.rs (captures request context)
//!     → handlers.rs (produce the response, possibly with their own headers)
//!     → middleware.rs (merge default security headers, set-if-absent)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod server;

pub use middleware::security_headers_middleware;
pub use server::{HttpServer, ServerError};
