//! Trace recording and replay.
//!
//! - [`TraceStore`] encodes traces in TEXT, JSON, BIN_BE or BIN_LE and moves them to and from disk.
//! - `record-rate` ([`RecordingController`]) wraps another controller and records its realized pacing.
//! - `replay-rate` ([`ReplayingController`]) reproduces a recorded trace.
mod error;
mod record;
mod replay;
mod store;

pub use error::TraceError;
pub use record::{RECORD_RATE, RecordRateFactory, RecordingController};
pub use replay::{REPLAY_RATE, ReplayRateFactory, ReplayingController};
pub use store::TraceStore;

use std::sync::Arc;

use tempo_core::{ControllerRegistry, CoreError};

/// Register `record-rate` and `replay-rate` in the given registry.
pub fn register_trace_controllers(registry: &mut ControllerRegistry) -> Result<(), CoreError> {
    registry.register(Arc::new(RecordRateFactory))?;
    registry.register(Arc::new(ReplayRateFactory))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, time::Duration};

    use async_trait::async_trait;
    use tempo_core::{BuildContext, ControlError, ControllerFactory, RateController, pace};
    use tempo_model::{RateControlSpec, RoundBound, RoundContext};
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    use super::*;

    /// Waits the delays listed in `opts.delays`, in order.
    struct Scripted {
        delays: VecDeque<u64>,
        cancel: CancellationToken,
    }

    #[async_trait]
    impl RateController for Scripted {
        fn name(&self) -> &str {
            "scripted-rate"
        }

        async fn apply_rate_control(&mut self) -> Result<(), ControlError> {
            let ms = self.delays.pop_front().unwrap_or(0);
            pace(Duration::from_millis(ms), &self.cancel).await
        }
    }

    struct ScriptedFactory;

    impl ControllerFactory for ScriptedFactory {
        fn name(&self) -> &str {
            "scripted-rate"
        }

        fn build(
            &self,
            spec: &RateControlSpec,
            _round: &RoundContext,
            registry: &ControllerRegistry,
        ) -> Result<Box<dyn RateController>, CoreError> {
            #[derive(serde::Deserialize)]
            struct Opts {
                delays: VecDeque<u64>,
            }
            let opts: Opts = spec
                .parse_opts()
                .map_err(|e| CoreError::invalid_opts("scripted-rate", e))?;
            Ok(Box::new(Scripted {
                delays: opts.delays,
                cancel: registry.ctx().cancel().clone(),
            }))
        }
    }

    fn registry(root: &std::path::Path) -> ControllerRegistry {
        let mut registry = ControllerRegistry::new()
            .with_context(BuildContext::default().with_trace_root(root));
        register_trace_controllers(&mut registry).unwrap();
        registry.register(Arc::new(ScriptedFactory)).unwrap();
        registry
    }

    fn spec(value: serde_json::Value) -> RateControlSpec {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn recorded_round_replays_with_the_same_delays() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(dir.path());

        let record = spec(serde_json::json!({
            "type": "record-rate",
            "opts": {
                "rateController": {
                    "type": "scripted-rate",
                    "opts": {"delays": [100, 200, 300, 400, 500]}
                },
                "pathTemplate": "records/client<C>_round<R>.bin",
                "outputFormat": "BIN_LE",
                "logEnd": true
            }
        }));
        let round = RoundContext::new(1, 2, 2, RoundBound::Count(5), record.clone());
        let mut recorder = registry.resolve_round(&round).unwrap();
        for _ in 0..5 {
            recorder.apply_rate_control().await.unwrap();
        }
        recorder.end().await.unwrap();
        assert!(dir.path().join("records/client1_round2.bin").exists());

        let replay = spec(serde_json::json!({
            "type": "replay-rate",
            "opts": {
                "pathTemplate": "records/client<C>_round<R>.bin",
                "inputFormat": "BIN_LE"
            }
        }));
        let round = RoundContext::new(1, 2, 2, RoundBound::Count(5), replay.clone());
        let mut replayer = registry.resolve_round(&round).unwrap();

        for expected in [100, 200, 300, 400, 500] {
            let started = Instant::now();
            replayer.apply_rate_control().await.unwrap();
            assert_eq!(started.elapsed().as_millis(), expected);
        }
        let err = replayer.apply_rate_control().await.unwrap_err();
        assert!(matches!(err, ControlError::TraceExhausted { recorded: 5 }));
    }

    #[tokio::test]
    async fn workers_write_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(dir.path());
        let record = spec(serde_json::json!({
            "type": "record-rate",
            "opts": {
                "rateController": {"type": "scripted-rate", "opts": {"delays": []}},
                "pathTemplate": "client<C>_round<R>.txt",
                "logEnd": true
            }
        }));

        for worker in 0..3 {
            let round = RoundContext::new(worker, 0, 3, RoundBound::Count(1), record.clone());
            let mut ctl = registry.resolve_round(&round).unwrap();
            ctl.apply_rate_control().await.unwrap();
            ctl.end().await.unwrap();
        }

        for worker in 0..3 {
            let path = dir.path().join(format!("client{worker}_round0.txt"));
            assert_eq!(std::fs::read_to_string(path).unwrap().lines().count(), 1);
        }
    }
}
