//! Telemetry contract: spans, metrics and business events.
//!
//! Implementations are strategy objects chosen once at startup (a real
//! sink or a no-op) and shared as `Arc<dyn TelemetryService>`. Emission
//! is fire-and-forget: nothing here returns an error or blocks.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// One logical operation being timed.
///
/// Implementations receive exactly one `end` call, issued by
/// [`SpanGuard`].
pub trait Span: Send {
    fn set_tag(&mut self, key: &'static str, value: String);

    fn set_error(&mut self, message: String);

    /// The `tracing` span backing this span, entered while the wrapped
    /// operation runs so that child spans nest under it.
    fn tracing_span(&self) -> tracing::Span {
        tracing::Span::none()
    }

    fn end(&mut self);
}

/// Span that records nothing. Zero-sized, so boxing it does not allocate.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSpan;

impl Span for NoopSpan {
    fn set_tag(&mut self, _key: &'static str, _value: String) {}
    fn set_error(&mut self, _message: String) {}
    fn end(&mut self) {}
}

/// Scoped owner of an open span. The span ends when the guard is dropped
/// or [`SpanGuard::end`] is called, whichever happens first, so every exit
/// path (including `?` and panics) closes it exactly once.
pub struct SpanGuard {
    inner: Box<dyn Span>,
    ended: bool,
}

impl SpanGuard {
    pub fn new(inner: Box<dyn Span>) -> Self {
        Self {
            inner,
            ended: false,
        }
    }

    pub fn noop() -> Self {
        Self::new(Box::new(NoopSpan))
    }

    pub fn set_tag(&mut self, key: &'static str, value: impl Into<String>) {
        self.inner.set_tag(key, value.into());
    }

    pub fn set_error(&mut self, err: &(dyn std::error::Error + 'static)) {
        self.inner.set_error(err.to_string());
    }

    pub fn set_error_message(&mut self, message: impl Into<String>) {
        self.inner.set_error(message.into());
    }

    pub fn tracing_span(&self) -> tracing::Span {
        self.inner.tracing_span()
    }

    pub fn end(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if !self.ended {
            self.ended = true;
            self.inner.end();
        }
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        self.finish();
    }
}

impl std::fmt::Debug for SpanGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpanGuard")
            .field("ended", &self.ended)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Monotonic count; `value` is the increment.
    Counter,
    /// Distribution sample (durations, sizes).
    Histogram,
}

/// A named numeric observation with a fixed tag set.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: &'static str,
    pub kind: MetricKind,
    pub value: f64,
    pub tags: Vec<(&'static str, String)>,
}

impl Metric {
    pub fn counter(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Counter,
            value: 1.0,
            tags: Vec::new(),
        }
    }

    pub fn histogram(name: &'static str, value: f64) -> Self {
        Self {
            name,
            kind: MetricKind::Histogram,
            value,
            tags: Vec::new(),
        }
    }

    pub fn with_tag(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.tags.push((key, value.into()));
        self
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A business-significant occurrence (registration succeeded, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: &'static str,
    pub properties: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            properties: Map::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }
}

pub trait TelemetryService: Send + Sync {
    fn start_span(&self, name: &'static str) -> SpanGuard;

    fn track_metric(&self, metric: Metric);

    fn track_event(&self, event: Event);

    fn is_enabled(&self) -> bool {
        true
    }
}
