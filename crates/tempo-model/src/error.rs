use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown trace format: {0} (expected: TEXT|JSON|BIN_BE|BIN_LE)")]
    UnknownTraceFormat(String),

    #[error("invalid path template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("invalid model: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
