use std::{fmt, path::PathBuf};

use tokio_util::sync::CancellationToken;

use crate::{metrics::MetricsHandle, stats::StatsHandle};

/// Shared build context handed to every controller factory.
#[derive(Clone)]
pub struct BuildContext {
    stats: StatsHandle,
    metrics: MetricsHandle,
    cancel: CancellationToken,
    trace_root: PathBuf,
}

impl BuildContext {
    /// Create a new build context with the given params.
    pub fn new(stats: StatsHandle, metrics: MetricsHandle, cancel: CancellationToken) -> Self {
        Self {
            stats,
            metrics,
            cancel,
            trace_root: PathBuf::from("."),
        }
    }

    /// Read-only statistics of the current round.
    pub fn stats(&self) -> &StatsHandle {
        &self.stats
    }

    /// Clonable handle to the metrics backend.
    pub fn metrics(&self) -> &MetricsHandle {
        &self.metrics
    }

    /// Token fired when the round is aborted.
    pub fn cancel(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Directory that relative trace paths are resolved against.
    pub fn trace_root(&self) -> &PathBuf {
        &self.trace_root
    }

    /// Replace the statistics source and return updated context.
    pub fn with_stats(mut self, stats: StatsHandle) -> Self {
        self.stats = stats;
        self
    }

    /// Replace the metrics backend and return updated context.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Replace the cancellation token and return updated context.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Replace the trace root and return updated context.
    pub fn with_trace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.trace_root = root.into();
        self
    }
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::new(
            crate::stats::noop_stats(),
            crate::metrics::noop_metrics(),
            CancellationToken::new(),
        )
    }
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("stats", &"<handle>")
            .field("metrics", &"<handle>")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("trace_root", &self.trace_root)
            .finish()
    }
}

impl fmt::Display for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuildContext(trace_root={})", self.trace_root.display())
    }
}
