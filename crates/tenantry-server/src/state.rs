//! Shared router state.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use tenantry_core::telemetry::TelemetryService;

use crate::token::TokenIssuer;

/// Everything a handler can reach. Generic over the authenticator so
/// routes can be exercised with a test double.
pub struct AppState<A> {
    pub auth: Arc<A>,
    pub telemetry: Arc<dyn TelemetryService>,
    pub tokens: Arc<dyn TokenIssuer>,
    /// Present when the Prometheus recorder was installed.
    pub metrics: Option<PrometheusHandle>,
}

impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            auth: Arc::clone(&self.auth),
            telemetry: Arc::clone(&self.telemetry),
            tokens: Arc::clone(&self.tokens),
            metrics: self.metrics.clone(),
        }
    }
}
