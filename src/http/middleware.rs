//! Security header middleware.
//!
//! Runs the inner service first, then merges the policy's default headers
//! into the finished response without touching headers the handler set.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use crate::observability::metrics;
use crate::security::{apply_with_report, SharedSecurityHeaders};

pub async fn security_headers_middleware(
    State(policy): State<SharedSecurityHeaders>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Pin the policy for the whole request so a reload mid-flight is not observed.
    let policy = policy.load_full();
    let context = policy.context_for(request.uri(), request.headers());

    let mut response = next.run(request).await;

    let proposals = policy.proposals(&context);
    let report = apply_with_report(response.headers_mut(), &proposals);

    tracing::trace!(
        secure = context.is_secure,
        status = %response.status(),
        inserted = report.inserted,
        preserved = report.preserved,
        skipped = report.skipped,
        "Security headers applied"
    );
    metrics::record_apply(&report);

    response
}
