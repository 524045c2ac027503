mod config;
mod error;
mod install;
mod object;

pub use config::{LoggerConfig, LoggerOutput};
pub use error::{LoggerError, LoggerResult};
pub use object::{LoggerFormat, LoggerLevel, UtcRfc3339};

/// Install the global tracing subscriber described by `cfg`.
///
/// Can be called once per process; later calls return [`LoggerError::AlreadyInitialized`].
///
/// # Examples
/// ```rust
/// use tempo_observe::{LoggerConfig, init_logger};
///
/// let config = LoggerConfig::default();
/// init_logger(&config).expect("logger");
/// tracing::info!("worker starting");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    match cfg.format {
        LoggerFormat::Text => install::text(cfg),
        LoggerFormat::Json => install::json(cfg),
    }
}
