use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving and constructing a controller tree.
///
/// All of them are fatal to the round of the affected worker.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("rate controller \"{name}\" could not be loaded: {reason}")]
    Resolution { name: String, reason: String },

    #[error("rate controller \"{0}\" is already registered")]
    DuplicateController(String),

    #[error("invalid options for rate controller \"{controller}\": {reason}")]
    InvalidOpts { controller: String, reason: String },

    #[error("trace file not found: {}", path.display())]
    TraceNotFound { path: PathBuf },

    #[error("malformed trace file {}: {reason}", path.display())]
    TraceFormat { path: PathBuf, reason: String },

    #[error("io error: {0}")]
    Io(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::InvalidOpts`].
    pub fn invalid_opts(controller: impl Into<String>, reason: impl ToString) -> Self {
        CoreError::InvalidOpts {
            controller: controller.into(),
            reason: reason.to_string(),
        }
    }

    /// Low-cardinality label used by metrics backends.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Resolution { .. } => "resolution",
            CoreError::DuplicateController(_) => "duplicate",
            CoreError::InvalidOpts { .. } => "invalid_opts",
            CoreError::TraceNotFound { .. } => "trace_not_found",
            CoreError::TraceFormat { .. } => "trace_format",
            CoreError::Io(_) => "io",
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Io(e.to_string())
    }
}
