use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a live controller while pacing or finalizing.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("rate control cancelled")]
    Cancelled,

    #[error("trace exhausted: all {recorded} recorded samples were already replayed")]
    TraceExhausted { recorded: usize },

    #[error("failed to export trace to {}: {reason}", path.display())]
    Export { path: PathBuf, reason: String },

    #[error("plugin error: {0}")]
    Plugin(String),
}

impl ControlError {
    /// Returns `true` when the error only reflects an aborted round.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ControlError::Cancelled)
    }

    /// Low-cardinality label used by metrics backends.
    pub fn kind(&self) -> &'static str {
        match self {
            ControlError::Cancelled => "cancelled",
            ControlError::TraceExhausted { .. } => "trace_exhausted",
            ControlError::Export { .. } => "export",
            ControlError::Plugin(_) => "plugin",
        }
    }
}
