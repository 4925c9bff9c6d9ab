//! In-memory telemetry capture, used by tests across the workspace to
//! assert on spans, metrics and events.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tenantry_core::telemetry::{Event, Metric, Span, SpanGuard, TelemetryService};

/// Snapshot of one span as recorded so far.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSpan {
    pub name: &'static str,
    pub tags: Vec<(&'static str, String)>,
    pub error: Option<String>,
    /// Number of times the span was ended. Anything other than 1 after
    /// the operation returns is a bug.
    pub end_count: usize,
}

impl RecordedSpan {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Default)]
struct Recorded {
    spans: Vec<RecordedSpan>,
    metrics: Vec<Metric>,
    events: Vec<Event>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingTelemetry {
    state: Arc<Mutex<Recorded>>,
}

impl RecordingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn spans(&self) -> Vec<RecordedSpan> {
        self.lock().spans.clone()
    }

    pub fn spans_named(&self, name: &str) -> Vec<RecordedSpan> {
        self.lock()
            .spans
            .iter()
            .filter(|s| s.name == name)
            .cloned()
            .collect()
    }

    /// Spans that were not ended exactly once.
    pub fn unbalanced_spans(&self) -> Vec<RecordedSpan> {
        self.lock()
            .spans
            .iter()
            .filter(|s| s.end_count != 1)
            .cloned()
            .collect()
    }

    pub fn metrics(&self) -> Vec<Metric> {
        self.lock().metrics.clone()
    }

    pub fn metric_count(&self, name: &str) -> usize {
        self.lock().metrics.iter().filter(|m| m.name == name).count()
    }

    pub fn events(&self) -> Vec<Event> {
        self.lock().events.clone()
    }

    pub fn events_named(&self, name: &str) -> Vec<Event> {
        self.lock()
            .events
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.spans.clear();
        state.metrics.clear();
        state.events.clear();
    }
}

impl TelemetryService for RecordingTelemetry {
    fn start_span(&self, name: &'static str) -> SpanGuard {
        let index = {
            let mut state = self.lock();
            state.spans.push(RecordedSpan {
                name,
                tags: Vec::new(),
                error: None,
                end_count: 0,
            });
            state.spans.len() - 1
        };
        SpanGuard::new(Box::new(RecordingSpan {
            telemetry: self.clone(),
            index,
        }))
    }

    fn track_metric(&self, metric: Metric) {
        self.lock().metrics.push(metric);
    }

    fn track_event(&self, event: Event) {
        self.lock().events.push(event);
    }
}

struct RecordingSpan {
    telemetry: RecordingTelemetry,
    index: usize,
}

impl RecordingSpan {
    fn with<F: FnOnce(&mut RecordedSpan)>(&self, f: F) {
        let mut state = self.telemetry.lock();
        if let Some(span) = state.spans.get_mut(self.index) {
            f(span);
        }
    }
}

impl Span for RecordingSpan {
    fn set_tag(&mut self, key: &'static str, value: String) {
        self.with(|span| span.tags.push((key, value)));
    }

    fn set_error(&mut self, message: String) {
        self.with(|span| span.error = Some(message));
    }

    fn end(&mut self) {
        self.with(|span| span.end_count += 1);
    }
}
