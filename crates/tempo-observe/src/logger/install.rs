use tracing::Subscriber;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::logger::{
    config::{LoggerConfig, LoggerOutput},
    error::{LoggerError, LoggerResult},
    object::UtcRfc3339,
};

pub(crate) fn text(cfg: &LoggerConfig) -> LoggerResult<()> {
    let filter = cfg.effective_level()?.to_env_filter()?;
    let layer = fmt::layer()
        .with_ansi(cfg.should_use_color())
        .with_target(cfg.with_targets)
        .with_timer(UtcRfc3339);

    match cfg.output {
        LoggerOutput::Stdout => install(
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.with_writer(std::io::stdout)),
        ),
        LoggerOutput::Stderr => install(
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.with_writer(std::io::stderr)),
        ),
    }
}

pub(crate) fn json(cfg: &LoggerConfig) -> LoggerResult<()> {
    let filter = cfg.effective_level()?.to_env_filter()?;
    let layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(cfg.with_targets)
        .with_timer(UtcRfc3339);

    match cfg.output {
        LoggerOutput::Stdout => install(
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.with_writer(std::io::stdout)),
        ),
        LoggerOutput::Stderr => install(
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.with_writer(std::io::stderr)),
        ),
    }
}

fn install<S>(subscriber: S) -> LoggerResult<()>
where
    S: Subscriber + Send + Sync + 'static,
{
    subscriber
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}
