//! Telemetry configuration.

/// Decided once at startup and held for the process lifetime.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// `false` selects the no-op strategy.
    pub enabled: bool,
    /// Attached to every span as the `service` field.
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_name: "tenantry".into(),
        }
    }
}
