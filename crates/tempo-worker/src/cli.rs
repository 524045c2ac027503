use std::path::PathBuf;

use clap::Parser;
use tempo_observe::{LoggerFormat, LoggerLevel};

#[derive(Debug, Parser, Clone)]
#[command(name = "tempo-worker")]
#[command(about = "Runs one benchmark round under a rate-control policy")]
pub struct Cli {
    /// Round message (JSON) to execute.
    #[arg(value_name = "ROUND")]
    pub round: PathBuf,

    /// Index of this worker within the round.
    #[arg(long, short = 'w', default_value_t = 0)]
    pub worker: u32,

    /// Worker configuration file (JSON).
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `tempo_control=debug,info`.
    #[arg(long)]
    pub log_level: Option<LoggerLevel>,

    /// Log format: text or json.
    #[arg(long)]
    pub log_format: Option<LoggerFormat>,

    /// Directory that relative trace templates resolve against.
    #[arg(long)]
    pub trace_root: Option<PathBuf>,

    /// Directory searched for rate-controller plugin libraries.
    #[arg(long)]
    pub plugin_dir: Option<PathBuf>,

    /// Write Prometheus metrics here when the round ends.
    #[arg(long)]
    pub metrics_path: Option<PathBuf>,
}
