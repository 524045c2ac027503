use async_trait::async_trait;
use tempo_core::{ControlError, ControllerFactory, ControllerRegistry, CoreError, RateController};
use tempo_model::{CompositeRateOpts, RateControlSpec, RoundBound, RoundContext};
use tokio::time::Instant;
use tracing::{debug, info};

pub const COMPOSITE_RATE: &str = "composite-rate";

struct Stage {
    /// Round progress at which this stage hands over to the next one.
    until: f64,
    controller: Box<dyn RateController>,
}

/// Runs sub-controllers one after another, each for its weighted share of the round.
pub struct CompositeRate {
    stages: Vec<Stage>,
    active: usize,
    bound: RoundBound,
    start: Option<Instant>,
    attempt: u64,
    log_change: bool,
}

impl CompositeRate {
    /// `stages` pairs every controller with its cumulative switch point in `(0, 1]`.
    pub fn new(
        stages: Vec<(f64, Box<dyn RateController>)>,
        bound: RoundBound,
        log_change: bool,
    ) -> Self {
        Self {
            stages: stages
                .into_iter()
                .map(|(until, controller)| Stage { until, controller })
                .collect(),
            active: 0,
            bound,
            start: None,
            attempt: 0,
            log_change,
        }
    }

    /// Name of the sub-controller currently pacing submissions.
    pub fn active(&self) -> &str {
        self.stages[self.active].controller.name()
    }

    fn progress(&self, start: Instant) -> f64 {
        match self.bound {
            RoundBound::Duration(d) if !d.is_zero() => {
                start.elapsed().as_secs_f64() / d.as_secs_f64()
            }
            RoundBound::Duration(_) => 1.0,
            RoundBound::Count(n) => self.attempt as f64 / n.max(1) as f64,
        }
    }

    fn advance(&mut self, progress: f64) {
        while self.active + 1 < self.stages.len() && progress >= self.stages[self.active].until {
            let from = self.active;
            self.active += 1;
            let (prev, next) = (self.stages[from].controller.name(), self.active());
            if self.log_change {
                info!(from = prev, to = next, progress, "switching rate controller");
            } else {
                debug!(from = prev, to = next, progress, "switching rate controller");
            }
        }
    }
}

#[async_trait]
impl RateController for CompositeRate {
    fn name(&self) -> &str {
        COMPOSITE_RATE
    }

    async fn apply_rate_control(&mut self) -> Result<(), ControlError> {
        let start = *self.start.get_or_insert_with(Instant::now);
        let progress = self.progress(start);
        self.advance(progress);
        self.attempt += 1;
        self.stages[self.active].controller.apply_rate_control().await
    }

    /// Ends every sub-controller, including ones that never ran; the first error wins.
    async fn end(&mut self) -> Result<(), ControlError> {
        let mut first = None;
        for stage in &mut self.stages {
            if let Err(e) = stage.controller.end().await {
                debug!(
                    controller = stage.controller.name(),
                    error = %e,
                    "sub-controller end failed"
                );
                first.get_or_insert(e);
            }
        }
        first.map_or(Ok(()), Err)
    }
}

pub struct CompositeRateFactory;

impl CompositeRateFactory {
    /// Portion of the round owned by a stage with the given weight fraction.
    fn slice(bound: RoundBound, fraction: f64) -> RoundBound {
        match bound {
            RoundBound::Duration(d) => RoundBound::Duration(d.mul_f64(fraction)),
            RoundBound::Count(n) => RoundBound::Count((n as f64 * fraction).round() as u64),
        }
    }
}

impl ControllerFactory for CompositeRateFactory {
    fn name(&self) -> &str {
        COMPOSITE_RATE
    }

    fn build(
        &self,
        spec: &RateControlSpec,
        round: &RoundContext,
        registry: &ControllerRegistry,
    ) -> Result<Box<dyn RateController>, CoreError> {
        let opts: CompositeRateOpts = spec
            .parse_opts()
            .map_err(|e| CoreError::invalid_opts(COMPOSITE_RATE, e))?;
        opts.validate()
            .map_err(|e| CoreError::invalid_opts(COMPOSITE_RATE, e))?;

        let total: f64 = opts.weights.iter().sum();
        let mut stages = Vec::with_capacity(opts.rate_controllers.len());
        for ((inner, weight), until) in opts
            .rate_controllers
            .iter()
            .zip(&opts.weights)
            .zip(opts.boundaries())
        {
            let share = round.with_bound(Self::slice(round.bound(), weight / total));
            stages.push((until, registry.resolve(inner, &share)?));
        }

        Ok(Box::new(CompositeRate::new(stages, round.bound(), opts.log_change)))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::{FIXED_RATE, FixedRate, NO_RATE, NoRate, register_builtin_controllers};

    fn registry() -> ControllerRegistry {
        let mut registry = ControllerRegistry::new();
        register_builtin_controllers(&mut registry).unwrap();
        registry
    }

    fn composite(opts: serde_json::Value) -> RateControlSpec {
        serde_json::from_value(json!({"type": COMPOSITE_RATE, "opts": opts})).unwrap()
    }

    async fn releases(ctl: &mut dyn RateController, calls: usize) -> Vec<u128> {
        let started = Instant::now();
        let mut out = Vec::with_capacity(calls);
        for _ in 0..calls {
            ctl.apply_rate_control().await.unwrap();
            out.push(started.elapsed().as_millis());
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn switches_by_submission_count() {
        let spec = composite(json!({
            "weights": [1, 1],
            "rateControllers": [
                {"type": "fixed-rate", "opts": {"tps": 10}},
                {"type": "fixed-rate", "opts": {"tps": 20}}
            ]
        }));
        let round = RoundContext::new(0, 0, 1, RoundBound::Count(6), spec.clone());
        let mut ctl = registry().resolve(&spec, &round).unwrap();

        let at = releases(ctl.as_mut(), 6).await;
        assert_eq!(at, vec![0, 100, 200, 200, 250, 300]);
    }

    #[tokio::test(start_paused = true)]
    async fn switches_by_elapsed_time() {
        let cancel = CancellationToken::new();
        let stages: Vec<(f64, Box<dyn RateController>)> = vec![
            (0.25, Box::new(FixedRate::new(1.0, 1, cancel.clone()))),
            (1.0, Box::new(NoRate::new(cancel))),
        ];
        let bound = RoundBound::Duration(Duration::from_secs(4));
        let mut ctl = CompositeRate::new(stages, bound, true);

        ctl.apply_rate_control().await.unwrap();
        ctl.apply_rate_control().await.unwrap();
        assert_eq!(ctl.active(), FIXED_RATE);

        // One second in: a quarter of the round has passed.
        let started = Instant::now();
        ctl.apply_rate_control().await.unwrap();
        assert_eq!(ctl.active(), NO_RATE);
        assert_eq!(started.elapsed().as_millis(), 0);
    }

    #[test]
    fn nested_unknown_controller_fails_the_whole_tree() {
        let spec = composite(json!({
            "weights": [1, 1],
            "rateControllers": [{"type": "no-rate"}, {"type": "nonexistent-rate"}]
        }));
        let round = RoundContext::new(0, 0, 1, RoundBound::Count(10), spec.clone());

        let err = registry().resolve(&spec, &round).err().unwrap();
        assert!(matches!(&err, CoreError::Resolution { name, .. } if name == "nonexistent-rate"));
        assert!(err.to_string().contains("nonexistent-rate"));
    }

    #[test]
    fn mismatched_weights_are_rejected() {
        let spec = composite(json!({
            "weights": [1],
            "rateControllers": [{"type": "no-rate"}, {"type": "no-rate"}]
        }));
        let round = RoundContext::new(0, 0, 1, RoundBound::Count(10), spec.clone());

        let err = registry().resolve(&spec, &round).err().unwrap();
        assert!(
            matches!(err, CoreError::InvalidOpts { controller, .. } if controller == COMPOSITE_RATE)
        );
    }

    #[test]
    fn stages_get_their_share_of_the_round() {
        let bound = RoundBound::Duration(Duration::from_secs(100));
        assert_eq!(
            CompositeRateFactory::slice(bound, 0.25),
            RoundBound::Duration(Duration::from_secs(25))
        );
        assert_eq!(
            CompositeRateFactory::slice(RoundBound::Count(10), 0.3),
            RoundBound::Count(3)
        );
    }

    struct Ending(Arc<AtomicUsize>);

    #[async_trait]
    impl RateController for Ending {
        fn name(&self) -> &str {
            "ending"
        }

        async fn apply_rate_control(&mut self) -> Result<(), ControlError> {
            Ok(())
        }

        async fn end(&mut self) -> Result<(), ControlError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn end_reaches_every_stage() {
        let ended = Arc::new(AtomicUsize::new(0));
        let stages: Vec<(f64, Box<dyn RateController>)> = vec![
            (0.5, Box::new(Ending(Arc::clone(&ended)))),
            (1.0, Box::new(Ending(Arc::clone(&ended)))),
        ];
        let mut ctl = CompositeRate::new(stages, RoundBound::Count(4), false);

        ctl.apply_rate_control().await.unwrap();
        ctl.end().await.unwrap();
        assert_eq!(ended.load(Ordering::SeqCst), 2);
    }
}
