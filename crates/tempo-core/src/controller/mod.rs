//! Rate controller abstraction.
//!
//! A controller is built once per round from a `RateControlSpec` by the registry and then driven by the
//! worker's submission loop: one `apply_rate_control` call per transaction attempt, one `end` call when the
//! round terminates.
mod error;
pub use error::ControlError;

mod context;
pub use context::BuildContext;

mod pace;
pub use pace::{pace, pace_until};

use async_trait::async_trait;

/// Pluggable pacing policy for one worker and one round.
///
/// The `&mut self` receivers make calls on one instance strictly sequential.
/// Decorators own their inner controller as `Box<dyn RateController>`.
#[async_trait]
pub trait RateController: Send {
    /// Policy type name used in logs and metrics.
    fn name(&self) -> &str;

    /// Suspend the caller until the next submission is allowed.
    ///
    /// Returns [`ControlError::Cancelled`] if the round is aborted while waiting.
    async fn apply_rate_control(&mut self) -> Result<(), ControlError>;

    /// Finalize the controller once the round terminates.
    ///
    /// Invoked at most once. Controllers without buffered state keep the default no-op.
    async fn end(&mut self) -> Result<(), ControlError> {
        Ok(())
    }
}
