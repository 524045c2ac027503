use std::path::PathBuf;

use tempo_core::{ControlError, CoreError};
use tempo_model::TraceFormat;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("trace file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("malformed {format} trace {}: {reason}", path.display())]
    Format {
        path: PathBuf,
        format: TraceFormat,
        reason: String,
    },

    #[error("cannot encode trace {} as {format}: {reason}", path.display())]
    Encode {
        path: PathBuf,
        format: TraceFormat,
        reason: String,
    },

    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TraceError {
    pub fn path(&self) -> &PathBuf {
        match self {
            TraceError::NotFound { path }
            | TraceError::Format { path, .. }
            | TraceError::Encode { path, .. }
            | TraceError::Io { path, .. } => path,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| TraceError::Io { path, source }
    }
}

/// Import failures happen while a controller is being built.
impl From<TraceError> for CoreError {
    fn from(e: TraceError) -> Self {
        match e {
            TraceError::NotFound { path } => CoreError::TraceNotFound { path },
            TraceError::Format { path, reason, .. } => CoreError::TraceFormat { path, reason },
            other => CoreError::Io(other.to_string()),
        }
    }
}

/// Export failures happen when a round ends.
impl From<TraceError> for ControlError {
    fn from(e: TraceError) -> Self {
        ControlError::Export {
            path: e.path().clone(),
            reason: e.to_string(),
        }
    }
}
