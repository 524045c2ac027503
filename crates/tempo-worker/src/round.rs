use std::{path::Path, sync::Arc, time::Duration};

use anyhow::Context;
use tempo_control::register_builtin_controllers;
use tempo_core::{
    BuildContext, ControllerRegistry, CoreError, StatsCollector, TxStats, plugin::LibraryLoader,
};
use tempo_model::{RoundContext, RoundMessage};
use tempo_trace::register_trace_controllers;
use tokio::{task::JoinSet, time::Instant};
use tracing::{debug, info, instrument, warn};

use crate::config::{SyntheticTx, WorkerConfig};

/// Outcome of one round on this worker.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    pub submitted: u64,
    pub finished: u64,
    pub failed: u64,
    pub elapsed: Duration,
    pub cancelled: bool,
}

pub fn read_round(path: &Path, worker: u32) -> anyhow::Result<RoundContext> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading round message {}", path.display()))?;
    let msg: RoundMessage = serde_json::from_str(&raw)
        .with_context(|| format!("parsing round message {}", path.display()))?;
    RoundContext::from_message(&msg, worker).context("invalid round message")
}

/// Registry with every built-in and trace controller, plus the plugin directory when configured.
pub fn build_registry(
    cfg: &WorkerConfig,
    ctx: BuildContext,
) -> Result<ControllerRegistry, CoreError> {
    let mut registry = ControllerRegistry::new().with_context(ctx);
    register_builtin_controllers(&mut registry)?;
    register_trace_controllers(&mut registry)?;
    if let Some(dir) = &cfg.plugin_dir {
        debug!(dir = %dir.display(), "plugin directory enabled");
        registry.register_loader(Arc::new(LibraryLoader::new(dir)));
    }
    Ok(registry)
}

/// Run the submission loop of one round.
///
/// The loop asks the controller for permission before every submission and stops when
/// the round bound is reached or the build context is cancelled. In-flight transactions
/// are drained and the controller is always ended, even after a pacing error.
#[instrument(
    skip_all,
    fields(label = round.label(), worker = round.worker_index(), round = round.round_index())
)]
pub async fn run_round(
    registry: &ControllerRegistry,
    round: &RoundContext,
    stats: Arc<TxStats>,
    tx: &SyntheticTx,
) -> anyhow::Result<RoundReport> {
    let mut controller = registry.resolve_round(round)?;
    let metrics = Arc::clone(registry.ctx().metrics());
    let started = Instant::now();
    let deadline = round.duration().map(|d| started + d);
    let mut pending = JoinSet::new();
    let mut cancelled = false;

    info!(controller = controller.name(), "round started");
    let paced = loop {
        if round.tx_number().is_some_and(|n| stats.submitted() >= n) {
            break Ok(());
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break Ok(());
        }

        let before = Instant::now();
        let step = match deadline {
            Some(d) => tokio::select! {
                r = controller.apply_rate_control() => Some(r),
                _ = tokio::time::sleep_until(d) => None,
            },
            None => Some(controller.apply_rate_control().await),
        };
        match step {
            None => break Ok(()),
            Some(Ok(())) => {}
            Some(Err(e)) if e.is_cancelled() => {
                cancelled = true;
                break Ok(());
            }
            Some(Err(e)) => {
                metrics.record_controller_error(controller.name(), e.kind());
                break Err(e);
            }
        }
        // Nothing is submitted at or after the deadline.
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break Ok(());
        }
        metrics.record_control_applied(controller.name(), before.elapsed().as_millis() as u64);

        stats.record_submitted();
        let latency = tx.latency();
        let done = Arc::clone(&stats);
        pending.spawn(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            done.record_finished(true);
        });
        while pending.try_join_next().is_some() {}
        tokio::task::yield_now().await;
    };

    while pending.join_next().await.is_some() {}
    let ended = controller.end().await;

    let report = RoundReport {
        submitted: stats.submitted(),
        finished: stats.finished(),
        failed: stats.failed(),
        elapsed: started.elapsed(),
        cancelled,
    };
    info!(
        submitted = report.submitted,
        finished = report.finished,
        failed = report.failed,
        elapsed_ms = report.elapsed.as_millis() as u64,
        cancelled = report.cancelled,
        "round finished"
    );

    if let Err(e) = &ended {
        warn!(error = %e, "controller end failed");
    }
    paced.context("rate control failed")?;
    ended.context("finalizing rate controller failed")?;
    Ok(report)
}
