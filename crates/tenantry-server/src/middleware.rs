//! Per-request telemetry.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::http::header::USER_AGENT;
use axum::middleware::Next;
use axum::response::Response;
use tenantry_core::telemetry::{Event, Metric, TelemetryService};
use tracing::Instrument;

/// Wrap every request in an `http.request` span and record its duration
/// and outcome.
///
/// The duration metric is labelled with the matched route, not the raw
/// path, so unknown URLs cannot grow the label set.
pub async fn request_telemetry(
    State(telemetry): State<Arc<dyn TelemetryService>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".into());

    let mut span = telemetry.start_span("http.request");
    span.set_tag("http.method", method.as_str());
    span.set_tag("http.url", path.as_str());
    if let Some(agent) = request
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
    {
        span.set_tag("http.user_agent", agent);
    }

    let response = next.run(request).instrument(span.tracing_span()).await;

    let status = response.status().as_u16();
    span.set_tag("http.status_code", status.to_string());
    if response.status().is_server_error() {
        span.set_error_message(format!("status {status}"));
    }

    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
    telemetry.track_metric(
        Metric::histogram("http.request.duration", duration_ms)
            .with_tag("method", method.as_str())
            .with_tag("path", route)
            .with_tag("status", status.to_string()),
    );
    telemetry.track_event(
        Event::new("http.request.completed")
            .with_property("method", method)
            .with_property("path", path)
            .with_property("status_code", status)
            .with_property("duration_ms", duration_ms),
    );

    span.end();
    response
}
