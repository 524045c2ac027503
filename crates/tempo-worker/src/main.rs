mod cli;
mod config;
mod round;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tempo_core::{BuildContext, TxStats};
use tempo_observe::init_logger;
use tempo_prometheus::PrometheusMetrics;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    cli::Cli,
    config::WorkerConfig,
    round::{build_registry, read_round, run_round},
};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    // 1) config
    let cli = Cli::parse();
    let cfg = WorkerConfig::load(cli.config.as_deref())?.with_overrides(&cli);

    // 2) logger
    init_logger(&cfg.logger)?;
    info!(worker = cli.worker, round = %cli.round.display(), "worker starting");

    // 3) round
    let round = read_round(&cli.round, cli.worker)?;

    // 4) cancellation on ctrl-c
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling round");
            on_signal.cancel();
        }
    });

    // 5) registry
    let metrics = PrometheusMetrics::new()?;
    let stats = Arc::new(TxStats::new());
    let ctx = BuildContext::new(stats.clone(), Arc::new(metrics.clone()), cancel)
        .with_trace_root(&cfg.trace_root);
    let registry = build_registry(&cfg, ctx)?;

    // 6) run
    let result = run_round(&registry, &round, stats, &cfg.workload).await;

    // 7) metrics
    if let Some(path) = &cfg.metrics_path {
        std::fs::write(path, metrics.encode_text()?)
            .with_context(|| format!("writing metrics to {}", path.display()))?;
    }

    let report = result?;
    info!(submitted = report.submitted, cancelled = report.cancelled, "worker done");
    Ok(())
}
