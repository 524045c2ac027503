use async_trait::async_trait;
use tempo_core::{ControlError, ControllerFactory, ControllerRegistry, CoreError, RateController};
use tempo_model::{RateControlSpec, RoundContext};
use tokio_util::sync::CancellationToken;

pub const NO_RATE: &str = "no-rate";

/// Submits as fast as the worker can; only reacts to cancellation.
pub struct NoRate {
    cancel: CancellationToken,
}

impl NoRate {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }
}

#[async_trait]
impl RateController for NoRate {
    fn name(&self) -> &str {
        NO_RATE
    }

    async fn apply_rate_control(&mut self) -> Result<(), ControlError> {
        if self.cancel.is_cancelled() {
            return Err(ControlError::Cancelled);
        }
        Ok(())
    }
}

pub struct NoRateFactory;

impl ControllerFactory for NoRateFactory {
    fn name(&self) -> &str {
        NO_RATE
    }

    fn build(
        &self,
        _spec: &RateControlSpec,
        _round: &RoundContext,
        registry: &ControllerRegistry,
    ) -> Result<Box<dyn RateController>, CoreError> {
        Ok(Box::new(NoRate::new(registry.ctx().cancel().clone())))
    }
}
