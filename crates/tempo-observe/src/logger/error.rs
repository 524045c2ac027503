use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("invalid log format: {0} (expected: text|json)")]
    InvalidFormat(String),

    #[error("invalid log output: {0} (expected: stdout|stderr)")]
    InvalidOutput(String),

    #[error("invalid log level: {0}")]
    InvalidLevel(String),

    #[error("logger already initialized")]
    AlreadyInitialized,
}

pub type LoggerResult<T> = Result<T, LoggerError>;
