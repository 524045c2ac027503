use std::time::Duration;

use async_trait::async_trait;
use tempo_core::{
    ControlError, ControllerFactory, ControllerRegistry, CoreError, RateController, pace_until,
};
use tempo_model::{RateControlSpec, RoundContext};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const ZERO_RATE: &str = "zero-rate";

/// Holds submissions back for the whole round.
///
/// The first call blocks until the round duration has passed since that call;
/// later calls return once the same deadline is reached.
pub struct ZeroRate {
    duration: Duration,
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl ZeroRate {
    pub fn new(duration: Duration, cancel: CancellationToken) -> Self {
        Self {
            duration,
            deadline: None,
            cancel,
        }
    }
}

#[async_trait]
impl RateController for ZeroRate {
    fn name(&self) -> &str {
        ZERO_RATE
    }

    async fn apply_rate_control(&mut self) -> Result<(), ControlError> {
        let deadline = *self
            .deadline
            .get_or_insert_with(|| Instant::now() + self.duration);
        debug!(
            remaining_ms = deadline.saturating_duration_since(Instant::now()).as_millis() as u64,
            "holding submissions"
        );
        pace_until(deadline, &self.cancel).await
    }
}

pub struct ZeroRateFactory;

impl ControllerFactory for ZeroRateFactory {
    fn name(&self) -> &str {
        ZERO_RATE
    }

    fn build(
        &self,
        _spec: &RateControlSpec,
        round: &RoundContext,
        registry: &ControllerRegistry,
    ) -> Result<Box<dyn RateController>, CoreError> {
        let duration = round.duration().ok_or_else(|| {
            CoreError::invalid_opts(ZERO_RATE, "requires a duration-bounded round")
        })?;
        Ok(Box::new(ZeroRate::new(duration, registry.ctx().cancel().clone())))
    }
}
