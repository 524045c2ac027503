use std::{path::{Path, PathBuf}, time::Duration};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tempo_observe::LoggerConfig;

use crate::cli::Cli;

/// Stand-in for the workload module: every transaction completes after a fixed latency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyntheticTx {
    pub latency_ms: u64,
}

impl SyntheticTx {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkerConfig {
    pub logger: LoggerConfig,
    pub trace_root: PathBuf,
    pub plugin_dir: Option<PathBuf>,
    pub metrics_path: Option<PathBuf>,
    pub workload: SyntheticTx,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            logger: LoggerConfig::default(),
            trace_root: PathBuf::from("."),
            plugin_dir: None,
            metrics_path: None,
            workload: SyntheticTx::default(),
        }
    }
}

impl WorkerConfig {
    /// Read the config file, or fall back to defaults when none is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading worker config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing worker config {}", path.display()))
    }

    /// Command-line flags win over the file.
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(level) = &cli.log_level {
            self.logger.level = level.clone();
        }
        if let Some(format) = cli.log_format {
            self.logger.format = format;
        }
        if let Some(root) = &cli.trace_root {
            self.trace_root = root.clone();
        }
        if cli.plugin_dir.is_some() {
            self.plugin_dir = cli.plugin_dir.clone();
        }
        if cli.metrics_path.is_some() {
            self.metrics_path = cli.metrics_path.clone();
        }
        self
    }
}
