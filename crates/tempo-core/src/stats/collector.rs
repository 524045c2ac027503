use std::{sync::Arc, time::Duration};

/// Live transaction statistics of the current round.
///
/// Implementations must answer without blocking; controllers call these methods from their pacing path.
pub trait StatsCollector: Send + Sync + 'static {
    /// Transactions submitted so far in this round.
    fn submitted(&self) -> u64;
    /// Transactions that completed (successfully or not).
    fn finished(&self) -> u64;
    /// Transactions that completed with an error.
    fn failed(&self) -> u64;
    /// Time since the round started.
    fn elapsed(&self) -> Duration;

    /// Transactions submitted but not yet finished.
    fn in_flight(&self) -> u64 {
        self.submitted().saturating_sub(self.finished())
    }
}

/// Shared handle to a statistics source.
pub type StatsHandle = Arc<dyn StatsCollector>;
