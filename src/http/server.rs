//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the built-in handlers
//! - Wire up middleware (security headers, timeout, request ID, tracing,
//!   concurrency limit)
//! - Serve over plain TCP or TLS with graceful shutdown
//! - Apply security policy reloads delivered by the config watcher

use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::loader::join_errors;
use crate::config::validation::{validate_config, ValidationError};
use crate::config::ServerConfig;
use crate::http::handlers;
use crate::http::middleware::security_headers_middleware;
use crate::net::tls::{load_tls_config, TlsError};
use crate::observability::metrics;
use crate::security::{PolicyError, SecurityHeaders, SharedSecurityHeaders};

/// Error type for server startup and serving.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid configuration: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),

    #[error("invalid security header policy: {0}")]
    Policy(#[from] PolicyError),

    #[error("TLS requested but listener.tls is not configured")]
    TlsNotConfigured,

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error("invalid bind address `{address}`: {source}")]
    BindAddress {
        address: String,
        #[source]
        source: AddrParseError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP server that decorates every response with default security headers.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    policy: SharedSecurityHeaders,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        Self::with_routes(config, Router::new())
    }

    /// Like [`HttpServer::new`], also serving `routes` behind the same middleware stack.
    ///
    /// The configuration is validated first; an invalid one is rejected
    /// before any layer is built.
    pub fn with_routes(config: ServerConfig, routes: Router) -> Result<Self, ServerError> {
        validate_config(&config).map_err(ServerError::Invalid)?;

        let policy = SecurityHeaders::from_config(&config.security, config.listener.tls.is_some())?
            .into_shared();
        let router = Self::build_router(&config, policy.clone(), routes);

        Ok(Self {
            router,
            config,
            policy,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, policy: SharedSecurityHeaders, routes: Router) -> Router {
        Router::new()
            .route("/", get(handlers::index))
            .route("/health", get(handlers::health))
            .route("/custom", get(handlers::custom_headers))
            .merge(routes)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::from_fn_with_state(policy, security_headers_middleware))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(GlobalConcurrencyLimitLayer::new(
                config.listener.max_concurrent_requests,
            ))
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<ServerConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, tls = false, "HTTP server starting");

        let reload = spawn_reload_task(self.policy.clone(), self.config.clone(), config_updates);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        reload.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `listener.bind_address` until `shutdown` fires.
    pub async fn run_tls(
        self,
        config_updates: mpsc::UnboundedReceiver<ServerConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let tls = self
            .config
            .listener
            .tls
            .as_ref()
            .ok_or(ServerError::TlsNotConfigured)?;
        let rustls = load_tls_config(tls).await?;

        let address = &self.config.listener.bind_address;
        let addr: SocketAddr = address.parse().map_err(|source| ServerError::BindAddress {
            address: address.clone(),
            source,
        })?;

        let handle = axum_server::Handle::new();
        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            shutdown_handle.graceful_shutdown(Some(grace));
        });

        tracing::info!(address = %addr, tls = true, "HTTP server starting");
        let reload = spawn_reload_task(self.policy.clone(), self.config.clone(), config_updates);

        axum_server::bind_rustls(addr, rustls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        reload.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Handle to the live policy; storing into it affects the next response.
    pub fn policy(&self) -> SharedSecurityHeaders {
        Arc::clone(&self.policy)
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Swap in a new security policy for each validated config update.
fn spawn_reload_task(
    policy: SharedSecurityHeaders,
    current: ServerConfig,
    mut updates: mpsc::UnboundedReceiver<ServerConfig>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let tls_terminated = current.listener.tls.is_some();

        while let Some(next) = updates.recv().await {
            if next.listener.bind_address != current.listener.bind_address
                || next.listener.tls.is_some() != tls_terminated
            {
                tracing::warn!("Listener changes require a restart and were not applied");
            }

            match SecurityHeaders::from_config(&next.security, tls_terminated) {
                Ok(headers) => {
                    policy.store(Arc::new(headers));
                    metrics::record_reload("applied");
                    tracing::info!("Security header policy reloaded");
                }
                Err(e) => {
                    metrics::record_reload("rejected");
                    tracing::error!(error = %e, "Rejected security header policy, keeping current");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtraHeaderConfig;
    use crate::security::RequestContext;

    fn has_header(policy: &SharedSecurityHeaders, name: &str) -> bool {
        policy
            .load()
            .proposals(&RequestContext::insecure())
            .iter()
            .any(|p| p.name == name)
    }

    #[tokio::test]
    async fn reload_swaps_policy() {
        let server = HttpServer::new(ServerConfig::default()).unwrap();
        let policy = server.policy();
        let (tx, rx) = mpsc::unbounded_channel();
        let task = spawn_reload_task(policy.clone(), server.config().clone(), rx);

        assert!(!has_header(&policy, "x-frame-options"));

        let mut next = ServerConfig::default();
        next.security.frame_options = "DENY".into();
        tx.send(next).unwrap();
        drop(tx);
        task.await.unwrap();

        assert!(has_header(&policy, "x-frame-options"));
    }

    #[tokio::test]
    async fn invalid_reload_keeps_current_policy() {
        let server = HttpServer::new(ServerConfig::default()).unwrap();
        let policy = server.policy();
        let (tx, rx) = mpsc::unbounded_channel();
        let task = spawn_reload_task(policy.clone(), server.config().clone(), rx);

        let mut next = ServerConfig::default();
        next.security.content_type_nosniff = false;
        next.security.extra_headers.push(ExtraHeaderConfig {
            name: "bad name".into(),
            value: "x".into(),
            secure_only: false,
        });
        tx.send(next).unwrap();
        drop(tx);
        task.await.unwrap();

        assert!(has_header(&policy, "x-content-type-options"));
    }

    #[tokio::test]
    async fn run_tls_without_tls_config_fails() {
        let server = HttpServer::new(ServerConfig::default()).unwrap();
        let (_tx, rx) = mpsc::unbounded_channel();
        let shutdown = broadcast::channel(1).1;

        let err = server.run_tls(rx, shutdown).await.unwrap_err();
        assert!(matches!(err, ServerError::TlsNotConfigured));
    }

    #[test]
    fn invalid_header_value_fails_construction() {
        let mut config = ServerConfig::default();
        config.security.cross_origin_opener_policy = "same-origin\nx".into();

        assert!(matches!(
            HttpServer::new(config),
            Err(ServerError::Invalid(_))
        ));
    }

    #[test]
    fn zero_concurrency_limit_is_rejected() {
        let mut config = ServerConfig::default();
        config.listener.max_concurrent_requests = 0;

        match HttpServer::new(config) {
            Err(ServerError::Invalid(errors)) => {
                assert_eq!(errors, vec![ValidationError::ZeroConcurrency]);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("server accepted a zero concurrency limit"),
        }
    }

    #[test]
    fn invalid_config_error_lists_every_problem() {
        let mut config = ServerConfig::default();
        config.listener.max_concurrent_requests = 0;
        config.timeouts.request_secs = 0;

        let err = HttpServer::new(config).err().unwrap();
        assert_eq!(
            err.to_string(),
            "invalid configuration: listener.max_concurrent_requests must be greater than 0, \
             timeouts.request_secs must be greater than 0"
        );
    }
}
