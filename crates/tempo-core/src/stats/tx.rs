use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use tokio::time::Instant;

use crate::stats::StatsCollector;

/// Lock-free transaction counters for one worker and one round.
///
/// The submission loop records events through the `record_*` methods; controllers read them through [`StatsCollector`].
#[derive(Debug)]
pub struct TxStats {
    submitted: AtomicU64,
    finished: AtomicU64,
    failed: AtomicU64,
    started: Instant,
}

impl TxStats {
    /// Counters starting now, all zero.
    pub fn new() -> Self {
        Self {
            submitted: AtomicU64::new(0),
            finished: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_finished(&self, success: bool) {
        if !success {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        self.finished.fetch_add(1, Ordering::Release);
    }
}

impl Default for TxStats {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsCollector for TxStats {
    fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    fn finished(&self) -> u64 {
        self.finished.load(Ordering::Acquire)
    }

    fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
