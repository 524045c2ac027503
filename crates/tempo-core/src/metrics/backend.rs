use std::sync::Arc;

/// Backend metrics collection interface.
///
/// Implementations are injected via [`crate::BuildContext`] and shared by every controller of a worker.
pub trait PacingMetrics: Send + Sync + 'static {
    /// Record one completed pacing decision.
    ///
    /// # Arguments
    /// - `controller`: policy type name of the top-level controller
    /// - `delay_ms`: realized wait in milliseconds
    fn record_control_applied(&self, controller: &str, delay_ms: u64);
    /// Record a trace written to durable storage.
    ///
    /// # Arguments
    /// - `format`: canonical trace format name
    /// - `samples`: number of exported samples
    fn record_trace_exported(&self, format: &str, samples: usize);
    /// Record a controller failure during resolution, pacing or finalization.
    ///
    /// # Arguments
    /// - `controller`: policy type name
    /// - `error_kind`: error category
    fn record_controller_error(&self, controller: &str, error_kind: &str);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn PacingMetrics>;
