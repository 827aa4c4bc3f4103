//! TLS configuration and certificate loading.

use std::path::{Path, PathBuf};

use axum_server::tls_rustls::RustlsConfig;

use crate::config::TlsConfig;

/// Error raised while loading TLS material.
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("{kind} file not found: {path:?}")]
    NotFound { kind: &'static str, path: PathBuf },

    #[error("failed to load certificate/key: {0}")]
    Load(#[from] std::io::Error),
}

fn ensure_exists(kind: &'static str, path: &Path) -> Result<(), TlsError> {
    if path.exists() {
        Ok(())
    } else {
        Err(TlsError::NotFound {
            kind,
            path: path.to_path_buf(),
        })
    }
}

/// Load rustls configuration from the PEM files named in `config`.
pub async fn load_tls_config(config: &TlsConfig) -> Result<RustlsConfig, TlsError> {
    let cert_path = Path::new(&config.cert_path);
    let key_path = Path::new(&config.key_path);

    ensure_exists("Certificate", cert_path)?;
    ensure_exists("Private key", key_path)?;

    let rustls = RustlsConfig::from_pem_file(cert_path, key_path).await?;
    tracing::info!(cert = %config.cert_path, "TLS certificate loaded");
    Ok(rustls)
}
