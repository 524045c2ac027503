use std::{fmt, io::IsTerminal, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::logger::{
    error::{LoggerError, LoggerResult},
    object::{LoggerFormat, LoggerLevel},
};

/// Stream the worker writes its logs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggerOutput {
    Stdout,
    #[default]
    Stderr,
}

impl LoggerOutput {
    fn is_terminal(&self) -> bool {
        match self {
            LoggerOutput::Stdout => std::io::stdout().is_terminal(),
            LoggerOutput::Stderr => std::io::stderr().is_terminal(),
        }
    }
}

impl FromStr for LoggerOutput {
    type Err = LoggerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            _ => Err(LoggerError::InvalidOutput(s.to_string())),
        }
    }
}

impl fmt::Display for LoggerOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoggerOutput::Stdout => "stdout",
            LoggerOutput::Stderr => "stderr",
        })
    }
}

/// Logger configuration, usually embedded in the worker config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` expression, e.g. `"info"` or `"tempo_control=debug,info"`.
    pub level: LoggerLevel,
    pub output: LoggerOutput,
    /// Let a non-empty `RUST_LOG` replace `level`.
    pub env_override: bool,
    pub with_targets: bool,
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            output: LoggerOutput::default(),
            env_override: true,
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Colors are used only when enabled and the output stream is a terminal.
    pub fn should_use_color(&self) -> bool {
        self.use_color && self.output.is_terminal()
    }

    /// Filter expression in effect, after the optional `RUST_LOG` override.
    pub fn effective_level(&self) -> LoggerResult<LoggerLevel> {
        if self.env_override {
            match std::env::var("RUST_LOG") {
                Ok(raw) if !raw.trim().is_empty() => return LoggerLevel::new(raw),
                _ => {}
            }
        }
        Ok(self.level.clone())
    }
}
