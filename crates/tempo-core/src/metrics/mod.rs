//! Metrics collection abstraction for rate controllers.
//!
//! Backends (prometheus, statsd, etc) implement [`PacingMetrics`] and are injected via [`crate::BuildContext`].
mod backend;
pub use backend::{MetricsHandle, PacingMetrics};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
