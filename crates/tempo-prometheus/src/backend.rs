use std::sync::Arc;

use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
    proto::MetricFamily,
};

use tempo_core::PacingMetrics;

const NAMESPACE: &str = "tempo";

/// Prometheus implementation of [`PacingMetrics`].
///
/// Labels stay low-cardinality: `controller` is a policy type name,
/// `format` a trace format and `error_kind` a [`tempo_core::CoreError::kind`] label.
#[derive(Clone)]
pub struct PrometheusMetrics {
    controls_applied: CounterVec,
    control_delay: HistogramVec,
    traces_exported: CounterVec,
    samples_exported: CounterVec,
    controller_errors: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Register all tempo metrics in `registry`.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let controls_applied = CounterVec::new(
            Opts::new("controls_applied_total", "Rate-control calls that released a submission")
                .namespace(NAMESPACE),
            &["controller"],
        )?;
        registry.register(Box::new(controls_applied.clone()))?;

        let control_delay = HistogramVec::new(
            HistogramOpts::new(
                "control_delay_seconds",
                "Realized delay of one rate-control call in seconds",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.0, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]),
            &["controller"],
        )?;
        registry.register(Box::new(control_delay.clone()))?;

        let traces_exported = CounterVec::new(
            Opts::new("traces_exported_total", "Trace files written").namespace(NAMESPACE),
            &["format"],
        )?;
        registry.register(Box::new(traces_exported.clone()))?;

        let samples_exported = CounterVec::new(
            Opts::new("trace_samples_exported_total", "Samples written to trace files")
                .namespace(NAMESPACE),
            &["format"],
        )?;
        registry.register(Box::new(samples_exported.clone()))?;

        let controller_errors = CounterVec::new(
            Opts::new("controller_errors_total", "Controller resolution and runtime errors")
                .namespace(NAMESPACE),
            &["controller", "error_kind"],
        )?;
        registry.register(Box::new(controller_errors.clone()))?;

        Ok(Self {
            controls_applied,
            control_delay,
            traces_exported,
            samples_exported,
            controller_errors,
            registry,
        })
    }

    /// Register all tempo metrics in a fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Current values in the Prometheus text exposition format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl PacingMetrics for PrometheusMetrics {
    fn record_control_applied(&self, controller: &str, delay_ms: u64) {
        self.controls_applied.with_label_values(&[controller]).inc();
        self.control_delay
            .with_label_values(&[controller])
            .observe(delay_ms as f64 / 1000.0);
    }

    fn record_trace_exported(&self, format: &str, samples: usize) {
        self.traces_exported.with_label_values(&[format]).inc();
        self.samples_exported
            .with_label_values(&[format])
            .inc_by(samples as f64);
    }

    fn record_controller_error(&self, controller: &str, error_kind: &str) {
        self.controller_errors
            .with_label_values(&[controller, error_kind])
            .inc();
    }
}
