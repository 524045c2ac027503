use async_trait::async_trait;
use tempo_core::{
    ControlError, ControllerFactory, ControllerRegistry, CoreError, RateController, pace_until,
};
use tempo_model::{LinearRateOpts, RateControlSpec, RoundBound, RoundContext};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::schedule::worker_interval;

pub const LINEAR_RATE: &str = "linear-rate";

/// Moves the submission rate linearly from a starting to a finishing TPS.
///
/// Progress is the elapsed share of the round duration, or the share of
/// submitted transactions for count-bounded rounds.
pub struct LinearRate {
    starting_tps: f64,
    finishing_tps: f64,
    workers: u32,
    bound: RoundBound,
    start: Option<Instant>,
    last: Option<Instant>,
    attempt: u64,
    cancel: CancellationToken,
}

impl LinearRate {
    pub fn new(
        opts: &LinearRateOpts,
        workers: u32,
        bound: RoundBound,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            starting_tps: opts.starting_tps,
            finishing_tps: opts.finishing_tps,
            workers,
            bound,
            start: None,
            last: None,
            attempt: 0,
            cancel,
        }
    }

    /// Share of the round covered at `at`, clamped to `[0, 1]`.
    fn progress(&self, start: Instant, at: Instant) -> f64 {
        let raw = match self.bound {
            RoundBound::Duration(d) if !d.is_zero() => {
                at.saturating_duration_since(start).as_secs_f64() / d.as_secs_f64()
            }
            RoundBound::Duration(_) => 1.0,
            RoundBound::Count(n) => self.attempt as f64 / n.max(1) as f64,
        };
        raw.clamp(0.0, 1.0)
    }

    fn tps_at(&self, progress: f64) -> f64 {
        self.starting_tps + (self.finishing_tps - self.starting_tps) * progress
    }
}

#[async_trait]
impl RateController for LinearRate {
    fn name(&self) -> &str {
        LINEAR_RATE
    }

    async fn apply_rate_control(&mut self) -> Result<(), ControlError> {
        let (start, last) = match (self.start, self.last) {
            (Some(start), Some(last)) => (start, last),
            _ => {
                let now = Instant::now();
                self.start = Some(now);
                self.last = Some(now);
                self.attempt = 1;
                return pace_until(now, &self.cancel).await;
            }
        };

        let tps = self.tps_at(self.progress(start, last));
        let release = last + worker_interval(tps, self.workers);
        self.last = Some(release);
        self.attempt += 1;
        pace_until(release, &self.cancel).await
    }
}

pub struct LinearRateFactory;

impl ControllerFactory for LinearRateFactory {
    fn name(&self) -> &str {
        LINEAR_RATE
    }

    fn build(
        &self,
        spec: &RateControlSpec,
        round: &RoundContext,
        registry: &ControllerRegistry,
    ) -> Result<Box<dyn RateController>, CoreError> {
        let opts: LinearRateOpts = spec
            .parse_opts()
            .map_err(|e| CoreError::invalid_opts(LINEAR_RATE, e))?;
        opts.validate()
            .map_err(|e| CoreError::invalid_opts(LINEAR_RATE, e))?;

        Ok(Box::new(LinearRate::new(
            &opts,
            round.total_workers(),
            round.bound(),
            registry.ctx().cancel().clone(),
        )))
    }
}
