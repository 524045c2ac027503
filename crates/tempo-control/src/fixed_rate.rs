use std::time::Duration;

use async_trait::async_trait;
use tempo_core::{
    ControlError, ControllerFactory, ControllerRegistry, CoreError, RateController, pace_until,
};
use tempo_model::{FixedRateOpts, RateControlSpec, RoundContext};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::schedule::{slot, worker_interval};

pub const FIXED_RATE: &str = "fixed-rate";

/// Releases submissions on a fixed grid.
///
/// Submission `i` is released at `start + i * interval`, where `start` is the first call.
/// A worker that falls behind the grid is released immediately until it catches up.
pub struct FixedRate {
    interval: Duration,
    start: Option<Instant>,
    attempt: u64,
    cancel: CancellationToken,
}

impl FixedRate {
    /// Rate of `tps` shared evenly by `workers`.
    pub fn new(tps: f64, workers: u32, cancel: CancellationToken) -> Self {
        Self {
            interval: worker_interval(tps, workers),
            start: None,
            attempt: 0,
            cancel,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl RateController for FixedRate {
    fn name(&self) -> &str {
        FIXED_RATE
    }

    async fn apply_rate_control(&mut self) -> Result<(), ControlError> {
        let start = *self.start.get_or_insert_with(Instant::now);
        let release = slot(start, self.interval, self.attempt);
        self.attempt += 1;
        pace_until(release, &self.cancel).await
    }
}

pub struct FixedRateFactory;

impl ControllerFactory for FixedRateFactory {
    fn name(&self) -> &str {
        FIXED_RATE
    }

    fn build(
        &self,
        spec: &RateControlSpec,
        round: &RoundContext,
        registry: &ControllerRegistry,
    ) -> Result<Box<dyn RateController>, CoreError> {
        let opts: FixedRateOpts = spec
            .parse_opts()
            .map_err(|e| CoreError::invalid_opts(FIXED_RATE, e))?;
        opts.validate()
            .map_err(|e| CoreError::invalid_opts(FIXED_RATE, e))?;

        Ok(Box::new(FixedRate::new(
            opts.tps,
            round.total_workers(),
            registry.ctx().cancel().clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempo_model::RoundBound;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn paces_on_a_grid() {
        let mut ctl = FixedRate::new(10.0, 2, CancellationToken::new());
        assert_eq!(ctl.interval(), Duration::from_millis(200));

        let started = Instant::now();
        let mut releases = Vec::new();
        for _ in 0..4 {
            ctl.apply_rate_control().await.unwrap();
            releases.push(started.elapsed().as_millis());
        }
        assert_eq!(releases, vec![0, 200, 400, 600]);
    }

    #[tokio::test(start_paused = true)]
    async fn late_callers_catch_up() {
        let mut ctl = FixedRate::new(10.0, 1, CancellationToken::new());
        let started = Instant::now();

        ctl.apply_rate_control().await.unwrap();
        tokio::time::sleep(Duration::from_millis(350)).await;

        // Slots 100, 200 and 300 are already due.
        for _ in 0..3 {
            ctl.apply_rate_control().await.unwrap();
        }
        assert_eq!(started.elapsed().as_millis(), 350);

        ctl.apply_rate_control().await.unwrap();
        assert_eq!(started.elapsed().as_millis(), 400);
    }

    #[test]
    fn factory_rejects_bad_tps() {
        let registry = ControllerRegistry::new();
        let spec = RateControlSpec::new(FIXED_RATE).with_opt("tps", json!(0));
        let round = RoundContext::new(0, 0, 1, RoundBound::Count(5), spec.clone());

        let err = FixedRateFactory.build(&spec, &round, &registry).err().unwrap();
        assert!(matches!(err, CoreError::InvalidOpts { .. }));
    }

    #[test]
    fn factory_uses_default_tps() {
        let registry = ControllerRegistry::new();
        let spec = RateControlSpec::new(FIXED_RATE);
        let round = RoundContext::new(0, 0, 1, RoundBound::Count(5), spec.clone());

        let ctl = FixedRateFactory.build(&spec, &round, &registry).unwrap();
        assert_eq!(ctl.name(), FIXED_RATE);
    }
}
