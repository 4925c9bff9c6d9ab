//! Disabled telemetry strategy.

use tenantry_core::telemetry::{Event, Metric, SpanGuard, TelemetryService};

/// Discards everything. Spans are zero-sized and never allocate.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl TelemetryService for NoopTelemetry {
    fn start_span(&self, _name: &'static str) -> SpanGuard {
        SpanGuard::noop()
    }

    fn track_metric(&self, _metric: Metric) {}

    fn track_event(&self, _event: Event) {}

    fn is_enabled(&self) -> bool {
        false
    }
}
