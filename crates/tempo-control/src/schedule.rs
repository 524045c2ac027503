use std::time::Duration;

use tokio::time::Instant;

/// Gap between two releases of one worker when `tps` is shared by `workers`.
pub(crate) fn worker_interval(tps: f64, workers: u32) -> Duration {
    let nanos = (1e9 * f64::from(workers.max(1)) / tps).round();
    Duration::from_nanos(nanos as u64)
}

/// Release time of submission `index` on a fixed grid anchored at `start`.
pub(crate) fn slot(start: Instant, interval: Duration, index: u64) -> Instant {
    let offset = (interval.as_nanos() as u64).saturating_mul(index);
    start + Duration::from_nanos(offset)
}
