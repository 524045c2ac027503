use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempo_core::{
    ControlError, ControllerFactory, ControllerRegistry, CoreError, MetricsHandle, RateController,
};
use tempo_model::{RateControlSpec, RecordRateOpts, RoundContext, Sample, TraceFormat};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::store::TraceStore;

pub const RECORD_RATE: &str = "record-rate";

/// Decorator that records the realized pacing of an inner controller.
///
/// Every completed call appends the milliseconds elapsed since the previous call
/// returned; the first sample is measured from construction. The inner controller
/// runs unmodified.
pub struct RecordingController {
    inner: Box<dyn RateController>,
    samples: Vec<Sample>,
    last: Instant,
    store: TraceStore,
    path: PathBuf,
    format: TraceFormat,
    log_end: bool,
    metrics: MetricsHandle,
}

impl RecordingController {
    pub fn new(
        inner: Box<dyn RateController>,
        store: TraceStore,
        path: PathBuf,
        format: TraceFormat,
        log_end: bool,
        metrics: MetricsHandle,
    ) -> Self {
        Self {
            inner,
            samples: Vec::new(),
            last: Instant::now(),
            store,
            path,
            format,
            log_end,
            metrics,
        }
    }

    /// Samples recorded so far, in call order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Destination of the exported trace.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn export(&mut self) -> Result<(), ControlError> {
        match self.store.export(&self.path, &self.samples, self.format).await {
            Ok(()) => {
                self.metrics
                    .record_trace_exported(self.format.as_str(), self.samples.len());
                info!(
                    path = %self.path.display(),
                    format = %self.format,
                    samples = self.samples.len(),
                    "trace recorded"
                );
                Ok(())
            }
            Err(e) => {
                self.metrics.record_controller_error(RECORD_RATE, "export");
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl RateController for RecordingController {
    fn name(&self) -> &str {
        RECORD_RATE
    }

    async fn apply_rate_control(&mut self) -> Result<(), ControlError> {
        self.inner.apply_rate_control().await?;

        let now = Instant::now();
        self.samples
            .push(now.duration_since(self.last).as_millis() as Sample);
        self.last = now;
        Ok(())
    }

    /// Ends the inner controller, then exports when `logEnd` is set.
    ///
    /// The export runs even if the inner controller failed to end; that failure
    /// is returned afterwards and takes precedence over an export failure.
    async fn end(&mut self) -> Result<(), ControlError> {
        let inner = self.inner.end().await;

        let exported = if self.log_end {
            self.export().await
        } else {
            debug!(samples = self.samples.len(), "logEnd disabled, trace not exported");
            Ok(())
        };

        match (inner, exported) {
            (Err(inner), Err(export)) => {
                warn!(error = %export, "trace export failed after inner controller error");
                Err(inner)
            }
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
            (Ok(()), Ok(())) => Ok(()),
        }
    }
}

pub struct RecordRateFactory;

impl ControllerFactory for RecordRateFactory {
    fn name(&self) -> &str {
        RECORD_RATE
    }

    fn build(
        &self,
        spec: &RateControlSpec,
        round: &RoundContext,
        registry: &ControllerRegistry,
    ) -> Result<Box<dyn RateController>, CoreError> {
        let opts: RecordRateOpts = spec
            .parse_opts()
            .map_err(|e| CoreError::invalid_opts(RECORD_RATE, e))?;

        let inner = registry.resolve(&opts.rate_controller, round)?;
        let store = TraceStore::new(registry.ctx().trace_root());
        let path =
            store.resolve_path(&opts.path_template, round.worker_index(), round.round_index());
        debug!(inner = inner.name(), path = %path.display(), "recording rate controller");

        Ok(Box::new(RecordingController::new(
            inner,
            store,
            path,
            opts.output_format,
            opts.log_end,
            registry.ctx().metrics().clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempo_core::{noop_metrics, pace};
    use tempo_model::RoundBound;
    use tokio_util::sync::CancellationToken;

    use super::*;

    /// Sleeps a fixed delay per call.
    struct Steady {
        delay: Duration,
        cancel: CancellationToken,
    }

    #[async_trait]
    impl RateController for Steady {
        fn name(&self) -> &str {
            "steady"
        }

        async fn apply_rate_control(&mut self) -> Result<(), ControlError> {
            pace(self.delay, &self.cancel).await
        }
    }

    struct FailingEnd;

    #[async_trait]
    impl RateController for FailingEnd {
        fn name(&self) -> &str {
            "failing-end"
        }

        async fn apply_rate_control(&mut self) -> Result<(), ControlError> {
            Ok(())
        }

        async fn end(&mut self) -> Result<(), ControlError> {
            Err(ControlError::Plugin("inner end failed".into()))
        }
    }

    fn steady(ms: u64, cancel: &CancellationToken) -> Box<dyn RateController> {
        Box::new(Steady {
            delay: Duration::from_millis(ms),
            cancel: cancel.clone(),
        })
    }

    fn recorder(
        inner: Box<dyn RateController>,
        dir: &Path,
        log_end: bool,
    ) -> RecordingController {
        RecordingController::new(
            inner,
            TraceStore::new(dir),
            dir.join("trace.txt"),
            TraceFormat::Text,
            log_end,
            noop_metrics(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn records_one_sample_per_call_without_changing_delays() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        let mut ctl = recorder(steady(100, &cancel), dir.path(), false);

        let started = Instant::now();
        for _ in 0..4 {
            ctl.apply_rate_control().await.unwrap();
        }

        assert_eq!(started.elapsed().as_millis(), 400);
        assert_eq!(ctl.samples(), &[100, 100, 100, 100]);
    }

    #[tokio::test(start_paused = true)]
    async fn samples_include_time_spent_outside_the_controller() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        let mut ctl = recorder(steady(10, &cancel), dir.path(), false);

        ctl.apply_rate_control().await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        ctl.apply_rate_control().await.unwrap();

        assert_eq!(ctl.samples(), &[10, 50]);
    }

    #[tokio::test(start_paused = true)]
    async fn end_exports_when_log_end_is_set() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        let mut ctl = recorder(steady(25, &cancel), dir.path(), true);

        for _ in 0..3 {
            ctl.apply_rate_control().await.unwrap();
        }
        ctl.end().await.unwrap();

        let content = std::fs::read_to_string(ctl.path()).unwrap();
        assert_eq!(content, "25\n25\n25\n");
    }

    #[tokio::test]
    async fn end_skips_export_without_log_end() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        let mut ctl = recorder(steady(0, &cancel), dir.path(), false);

        ctl.apply_rate_control().await.unwrap();
        ctl.end().await.unwrap();
        assert!(!ctl.path().exists());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_round_still_exports() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        let mut ctl = recorder(steady(100, &cancel), dir.path(), true);

        ctl.apply_rate_control().await.unwrap();
        ctl.apply_rate_control().await.unwrap();
        cancel.cancel();
        assert!(ctl.apply_rate_control().await.unwrap_err().is_cancelled());

        ctl.end().await.unwrap();
        let content = std::fs::read_to_string(ctl.path()).unwrap();
        assert_eq!(content, "100\n100\n");
    }

    #[tokio::test(start_paused = true)]
    async fn recorder_can_end_on_a_spawned_task() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = recorder(steady(0, &CancellationToken::new()), dir.path(), true);
        ctl.apply_rate_control().await.unwrap();

        let ctl = tokio::spawn(async move {
            ctl.end().await.map(|()| ctl)
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(std::fs::read_to_string(ctl.path()).unwrap(), "0\n");
    }

    #[tokio::test]
    async fn inner_end_failure_is_returned_after_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = recorder(Box::new(FailingEnd), dir.path(), true);

        ctl.apply_rate_control().await.unwrap();
        let err = ctl.end().await.unwrap_err();

        assert!(matches!(err, ControlError::Plugin(_)));
        assert!(ctl.path().exists());
    }

    #[tokio::test]
    async fn export_failure_surfaces_from_end() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut ctl = RecordingController::new(
            steady(0, &CancellationToken::new()),
            TraceStore::new(dir.path()),
            blocker.join("trace.txt"),
            TraceFormat::Text,
            true,
            noop_metrics(),
        );

        let err = ctl.end().await.unwrap_err();
        assert!(matches!(err, ControlError::Export { .. }), "{err:?}");
    }

    #[test]
    fn unknown_inner_controller_names_the_missing_type() {
        let registry = ControllerRegistry::new();
        let spec: RateControlSpec = serde_json::from_value(serde_json::json!({
            "type": RECORD_RATE,
            "opts": {
                "rateController": {"type": "nonexistent-rate"},
                "pathTemplate": "../tx_records_client<C>_round<R>.txt",
                "outputFormat": "TEXT",
                "logEnd": true
            }
        }))
        .unwrap();
        let round = RoundContext::new(0, 0, 2, RoundBound::Count(5), spec.clone());

        let err = RecordRateFactory.build(&spec, &round, &registry).err().unwrap();
        assert!(err.to_string().contains("nonexistent-rate"), "{err}");
        assert!(matches!(err, CoreError::Resolution { .. }));
    }
}
