use std::time::Duration;

use async_trait::async_trait;
use tempo_core::{
    ControlError, ControllerFactory, ControllerRegistry, CoreError, RateController, pace,
};
use tempo_model::{RateControlSpec, ReplayRateOpts, RoundContext, Sample};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::store::TraceStore;

pub const REPLAY_RATE: &str = "replay-rate";

/// Reproduces a recorded trace: call `i` waits for sample `i` milliseconds.
///
/// The trace is not reused; calling past its end is an error.
pub struct ReplayingController {
    samples: Vec<Sample>,
    cursor: usize,
    cancel: CancellationToken,
}

impl ReplayingController {
    pub fn new(samples: Vec<Sample>, cancel: CancellationToken) -> Self {
        Self {
            samples,
            cursor: 0,
            cancel,
        }
    }

    /// Samples not yet replayed.
    pub fn remaining(&self) -> usize {
        self.samples.len() - self.cursor
    }
}

#[async_trait]
impl RateController for ReplayingController {
    fn name(&self) -> &str {
        REPLAY_RATE
    }

    async fn apply_rate_control(&mut self) -> Result<(), ControlError> {
        let Some(&delay) = self.samples.get(self.cursor) else {
            return Err(ControlError::TraceExhausted {
                recorded: self.samples.len(),
            });
        };
        self.cursor += 1;
        pace(Duration::from_millis(delay), &self.cancel).await
    }
}

pub struct ReplayRateFactory;

impl ControllerFactory for ReplayRateFactory {
    fn name(&self) -> &str {
        REPLAY_RATE
    }

    fn build(
        &self,
        spec: &RateControlSpec,
        round: &RoundContext,
        registry: &ControllerRegistry,
    ) -> Result<Box<dyn RateController>, CoreError> {
        let opts: ReplayRateOpts = spec
            .parse_opts()
            .map_err(|e| CoreError::invalid_opts(REPLAY_RATE, e))?;

        let store = TraceStore::new(registry.ctx().trace_root());
        let path =
            store.resolve_path(&opts.path_template, round.worker_index(), round.round_index());
        let samples = store.import(&path, opts.input_format)?;
        debug!(path = %path.display(), samples = samples.len(), "replaying trace");

        Ok(Box::new(ReplayingController::new(
            samples,
            registry.ctx().cancel().clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use tempo_core::BuildContext;
    use tempo_model::RoundBound;
    use tokio::time::Instant;

    use super::*;

    fn replay_spec(template: &str) -> RateControlSpec {
        RateControlSpec::new(REPLAY_RATE).with_opt("pathTemplate", template)
    }

    fn registry_at(root: &std::path::Path) -> ControllerRegistry {
        ControllerRegistry::new().with_context(BuildContext::default().with_trace_root(root))
    }

    #[tokio::test(start_paused = true)]
    async fn replays_delays_then_reports_exhaustion() {
        let samples = vec![100, 200, 300, 400, 500];
        let mut ctl = ReplayingController::new(samples, CancellationToken::new());

        for expected in [100, 200, 300, 400, 500] {
            let started = Instant::now();
            ctl.apply_rate_control().await.unwrap();
            assert_eq!(started.elapsed().as_millis(), expected);
        }
        assert_eq!(ctl.remaining(), 0);

        let err = ctl.apply_rate_control().await.unwrap_err();
        assert!(matches!(err, ControlError::TraceExhausted { recorded: 5 }));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_a_long_sample() {
        let cancel = CancellationToken::new();
        let mut ctl = ReplayingController::new(vec![60_000], cancel.clone());

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            trigger.cancel();
        });

        assert!(ctl.apply_rate_control().await.unwrap_err().is_cancelled());
    }

    #[test]
    fn missing_trace_fails_construction() {
        let dir = tempfile::tempdir().unwrap();
        let spec = replay_spec("client<C>_round<R>.txt");
        let round = RoundContext::new(0, 0, 1, RoundBound::Count(5), spec.clone());

        let err = ReplayRateFactory
            .build(&spec, &round, &registry_at(dir.path()))
            .err()
            .unwrap();
        assert!(matches!(err, CoreError::TraceNotFound { .. }), "{err}");
    }

    #[test]
    fn malformed_trace_fails_construction() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("client0_round0.txt"), "100\nfast\n").unwrap();
        let spec = replay_spec("client<C>_round<R>.txt");
        let round = RoundContext::new(0, 0, 1, RoundBound::Count(5), spec.clone());

        let err = ReplayRateFactory
            .build(&spec, &round, &registry_at(dir.path()))
            .err()
            .unwrap();
        assert!(matches!(err, CoreError::TraceFormat { .. }), "{err}");
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn template_without_placeholders_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let spec = replay_spec("trace.txt");
        let round = RoundContext::new(0, 0, 1, RoundBound::Count(5), spec.clone());

        let err = ReplayRateFactory
            .build(&spec, &round, &registry_at(dir.path()))
            .err()
            .unwrap();
        assert!(matches!(err, CoreError::InvalidOpts { .. }), "{err}");
    }
}
