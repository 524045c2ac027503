use std::time::Duration;

use async_trait::async_trait;
use tempo_core::{
    ControlError, ControllerFactory, ControllerRegistry, CoreError, RateController, StatsHandle,
    pace, pace_until,
};
use tempo_model::{FixedLoadOpts, RateControlSpec, RoundContext};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::schedule::{slot, worker_interval};

pub const FIXED_LOAD: &str = "fixed-load";

/// Wait between two load checks while the worker is saturated.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Keeps a constant number of transactions in flight.
///
/// Until the first transaction finishes, submissions are paced at `startTps`.
/// Afterwards a call only waits while the worker's share of the load is saturated.
pub struct FixedLoad {
    load: u64,
    start_interval: Duration,
    stats: StatsHandle,
    start: Option<Instant>,
    attempt: u64,
    cancel: CancellationToken,
}

impl FixedLoad {
    pub fn new(
        opts: &FixedLoadOpts,
        workers: u32,
        stats: StatsHandle,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            load: opts.transaction_load.div_ceil(u64::from(workers.max(1))).max(1),
            start_interval: worker_interval(opts.start_tps, workers),
            stats,
            start: None,
            attempt: 0,
            cancel,
        }
    }

    /// In-flight limit of this worker.
    pub fn load(&self) -> u64 {
        self.load
    }

}

#[async_trait]
impl RateController for FixedLoad {
    fn name(&self) -> &str {
        FIXED_LOAD
    }

    async fn apply_rate_control(&mut self) -> Result<(), ControlError> {
        if self.stats.finished() == 0 {
            let start = *self.start.get_or_insert_with(Instant::now);
            pace_until(slot(start, self.start_interval, self.attempt), &self.cancel).await?;
        }
        self.attempt += 1;

        while self.stats.in_flight() >= self.load {
            trace!(
                in_flight = self.stats.in_flight(),
                load = self.load,
                "load saturated"
            );
            pace(POLL_INTERVAL, &self.cancel).await?;
        }
        Ok(())
    }
}

pub struct FixedLoadFactory;

impl ControllerFactory for FixedLoadFactory {
    fn name(&self) -> &str {
        FIXED_LOAD
    }

    fn build(
        &self,
        spec: &RateControlSpec,
        round: &RoundContext,
        registry: &ControllerRegistry,
    ) -> Result<Box<dyn RateController>, CoreError> {
        let opts: FixedLoadOpts = spec
            .parse_opts()
            .map_err(|e| CoreError::invalid_opts(FIXED_LOAD, e))?;
        opts.validate()
            .map_err(|e| CoreError::invalid_opts(FIXED_LOAD, e))?;

        Ok(Box::new(FixedLoad::new(
            &opts,
            round.total_workers(),
            registry.ctx().stats().clone(),
            registry.ctx().cancel().clone(),
        )))
    }
}
