//! Prometheus backend for the pacing metrics of a tempo worker.
//!
//! [`PrometheusMetrics`] implements [`tempo_core::PacingMetrics`]; plug it into the
//! registry through [`tempo_core::BuildContext::with_metrics`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tempo_core::{BuildContext, ControllerRegistry};
//! use tempo_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let ctx = BuildContext::default().with_metrics(Arc::new(metrics.clone()));
//! let _registry = ControllerRegistry::new().with_context(ctx);
//!
//! // After the round:
//! let exposition = metrics.encode_text()?;
//! assert!(exposition.is_empty() || exposition.contains("tempo_"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `tempo_controls_applied_total{controller}` - Counter
//! - `tempo_control_delay_seconds{controller}` - Histogram of realized delays
//! - `tempo_traces_exported_total{format}` - Counter
//! - `tempo_trace_samples_exported_total{format}` - Counter
//! - `tempo_controller_errors_total{controller, error_kind}` - Counter
mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
