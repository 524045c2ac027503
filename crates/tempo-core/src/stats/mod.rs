//! Read-only statistics seam.
//!
//! Transaction statistics are owned and written by the worker's execution layer.
//! Controllers only read them through [`StatsCollector`], e.g. to adapt pacing to the number of in-flight transactions.
mod collector;
pub use collector::{StatsCollector, StatsHandle};

mod noop;
pub use noop::NoopStats;

mod tx;
pub use tx::TxStats;

use std::sync::Arc;

/// Create a statistics handle that always reports zero.
#[inline]
pub fn noop_stats() -> StatsHandle {
    Arc::new(NoopStats)
}
