use crate::metrics::backend::PacingMetrics;

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl PacingMetrics for NoOpMetrics {
    #[inline(always)]
    fn record_control_applied(&self, _: &str, _: u64) {}

    #[inline(always)]
    fn record_trace_exported(&self, _: &str, _: usize) {}

    #[inline(always)]
    fn record_controller_error(&self, _: &str, _: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_metrics_is_zero_size() {
        assert_eq!(std::mem::size_of::<NoOpMetrics>(), 0);
    }

    #[test]
    fn noop_can_be_called_repeatedly() {
        let metrics = NoOpMetrics;
        for _ in 0..1000 {
            metrics.record_control_applied("fixed-rate", 100);
            metrics.record_trace_exported("TEXT", 10);
            metrics.record_controller_error("record-rate", "export");
        }
    }
}
