//! Metrics collection and exposition.
//!
//! # Metrics
//! - `secure_headers_inserted_total` (counter): default headers written
//! - `secure_headers_preserved_total` (counter): defaults discarded because
//!   the response already carried the header
//! - `secure_headers_skipped_total` (counter): defaults whose condition failed
//! - `secure_headers_config_reloads_total` (counter): reloads by outcome
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;

use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::security::ApplyReport;

/// Install the Prometheus recorder and serve it on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe();
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

fn describe() {
    describe_counter!(
        "secure_headers_inserted_total",
        "Default security headers written into responses"
    );
    describe_counter!(
        "secure_headers_preserved_total",
        "Default security headers discarded because the response already set them"
    );
    describe_counter!(
        "secure_headers_skipped_total",
        "Default security headers whose condition did not hold"
    );
    describe_counter!(
        "secure_headers_config_reloads_total",
        "Configuration reload attempts by outcome"
    );
}

/// Record the outcome of one header application.
pub fn record_apply(report: &ApplyReport) {
    counter!("secure_headers_inserted_total").increment(report.inserted as u64);
    counter!("secure_headers_preserved_total").increment(report.preserved as u64);
    counter!("secure_headers_skipped_total").increment(report.skipped as u64);
}

/// Record a configuration reload attempt (`applied`, `rejected`, `invalid`).
pub fn record_reload(outcome: &'static str) {
    counter!("secure_headers_config_reloads_total", "outcome" => outcome).increment(1);
}
