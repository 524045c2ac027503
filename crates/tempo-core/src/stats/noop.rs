use std::time::Duration;

use crate::stats::StatsCollector;

/// Statistics source that reports an idle round.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStats;

impl StatsCollector for NoopStats {
    #[inline(always)]
    fn submitted(&self) -> u64 {
        0
    }

    #[inline(always)]
    fn finished(&self) -> u64 {
        0
    }

    #[inline(always)]
    fn failed(&self) -> u64 {
        0
    }

    #[inline(always)]
    fn elapsed(&self) -> Duration {
        Duration::ZERO
    }
}
