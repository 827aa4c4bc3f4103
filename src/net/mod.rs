//! Network layer.
//!
//! Plain TCP is served by `axum::serve`; TLS termination goes through
//! `axum-server` with rustls. When TLS is on, every request is treated as
//! secure by the header policy.

pub mod tls;
