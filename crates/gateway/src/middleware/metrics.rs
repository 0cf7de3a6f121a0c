//! Per-route request metrics

use axum::{extract::MatchedPath, extract::Request, middleware::Next, response::Response};
use smartlegal_common::metrics::RequestMetrics;

/// Record count and latency for every routed request.
///
/// Labels use the route template (`/api/contracts/{id}`), never the raw
/// path, so contract ids do not explode label cardinality.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_string());

    let metrics = RequestMetrics::start(request.method().as_str(), &endpoint);
    let response = next.run(request).await;
    metrics.finish(response.status().as_u16());

    response
}
