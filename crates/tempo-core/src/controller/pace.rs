use std::time::Duration;

use tokio::time::{Instant, sleep, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::controller::ControlError;

/// Suspend for `delay`, or until `cancel` fires.
///
/// A zero delay returns immediately unless the token is already cancelled.
pub async fn pace(delay: Duration, cancel: &CancellationToken) -> Result<(), ControlError> {
    if cancel.is_cancelled() {
        return Err(ControlError::Cancelled);
    }
    if delay.is_zero() {
        return Ok(());
    }
    tokio::select! {
        _ = sleep(delay) => Ok(()),
        _ = cancel.cancelled() => Err(ControlError::Cancelled),
    }
}

/// Suspend until `deadline`, or until `cancel` fires.
///
/// Deadlines in the past return immediately.
pub async fn pace_until(deadline: Instant, cancel: &CancellationToken) -> Result<(), ControlError> {
    if cancel.is_cancelled() {
        return Err(ControlError::Cancelled);
    }
    if deadline <= Instant::now() {
        return Ok(());
    }
    tokio::select! {
        _ = sleep_until(deadline) => Ok(()),
        _ = cancel.cancelled() => Err(ControlError::Cancelled),
    }
}
