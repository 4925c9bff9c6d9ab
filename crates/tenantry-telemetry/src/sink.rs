//! `tracing` + `metrics` backed telemetry.

use std::time::Instant;

use metrics::Label;
use tenantry_core::telemetry::{Event, Metric, MetricKind, Span, SpanGuard, TelemetryService};
use tracing::field::Empty;

const SPAN_DURATION_METRIC: &str = "span.duration_ms";

/// Production telemetry sink.
///
/// No exporter is wired here; whichever `tracing` subscriber and
/// `metrics` recorder the process installs receives the data.
#[derive(Debug, Clone)]
pub struct TracingTelemetry {
    service_name: String,
}

impl TracingTelemetry {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }
}

impl TelemetryService for TracingTelemetry {
    fn start_span(&self, name: &'static str) -> SpanGuard {
        let span = tracing::info_span!(
            "operation",
            operation = name,
            service = %self.service_name,
            error = Empty,
        );
        SpanGuard::new(Box::new(TracingSpan {
            span,
            name,
            started: Instant::now(),
            tags: Vec::new(),
            error: None,
        }))
    }

    fn track_metric(&self, metric: Metric) {
        tracing::trace!(
            metric = metric.name,
            value = metric.value,
            tags = ?metric.tags,
            "metric"
        );

        let labels: Vec<Label> = metric
            .tags
            .into_iter()
            .map(|(key, value)| Label::new(key, value))
            .collect();

        match metric.kind {
            MetricKind::Counter => {
                metrics::counter!(metric.name, labels).increment(metric.value.max(0.0) as u64)
            }
            MetricKind::Histogram => metrics::histogram!(metric.name, labels).record(metric.value),
        }
    }

    fn track_event(&self, event: Event) {
        tracing::info!(
            target: "tenantry::events",
            event = event.name,
            timestamp = %event.timestamp.to_rfc3339(),
            properties = %serde_json::Value::Object(event.properties),
            "event"
        );
    }
}

struct TracingSpan {
    span: tracing::Span,
    name: &'static str,
    started: Instant,
    tags: Vec<(&'static str, String)>,
    error: Option<String>,
}

impl Span for TracingSpan {
    fn set_tag(&mut self, key: &'static str, value: String) {
        self.tags.push((key, value));
    }

    fn set_error(&mut self, message: String) {
        self.span.record("error", message.as_str());
        self.error = Some(message);
    }

    fn tracing_span(&self) -> tracing::Span {
        self.span.clone()
    }

    fn end(&mut self) {
        let elapsed = self.started.elapsed();
        let duration_ms = elapsed.as_secs_f64() * 1000.0;

        match &self.error {
            Some(error) => tracing::warn!(
                parent: &self.span,
                operation = self.name,
                duration_ms,
                tags = ?self.tags,
                error = %error,
                "span closed with error"
            ),
            None => tracing::debug!(
                parent: &self.span,
                operation = self.name,
                duration_ms,
                tags = ?self.tags,
                "span closed"
            ),
        }

        metrics::histogram!(SPAN_DURATION_METRIC, "operation" => self.name).record(duration_ms);
    }
}
