//! Tenantry Telemetry: implementations of the
//! [`TelemetryService`](tenantry_core::telemetry::TelemetryService)
//! contract.
//!
//! - [`TracingTelemetry`]: spans become `tracing` spans (so they nest
//!   under whatever span is active), metrics go to the `metrics` facade,
//!   events are structured `tracing` records.
//! - [`NoopTelemetry`]: the disabled strategy.
//! - [`RecordingTelemetry`]: in-memory capture for tests.

mod config;
mod noop;
mod recording;
mod sink;

use std::sync::Arc;

use tenantry_core::telemetry::TelemetryService;

pub use config::TelemetryConfig;
pub use noop::NoopTelemetry;
pub use recording::{RecordedSpan, RecordingTelemetry};
pub use sink::TracingTelemetry;

/// Select the telemetry strategy for the process. Called once at
/// startup; the result is shared for the process lifetime.
pub fn from_config(config: &TelemetryConfig) -> Arc<dyn TelemetryService> {
    if config.enabled {
        tracing::info!(service = %config.service_name, "Telemetry enabled");
        Arc::new(TracingTelemetry::new(config.service_name.clone()))
    } else {
        tracing::info!("Telemetry disabled");
        Arc::new(NoopTelemetry)
    }
}
