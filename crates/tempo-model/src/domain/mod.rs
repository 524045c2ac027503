mod constants;
pub use constants::{CLIENT_PLACEHOLDER, ROUND_PLACEHOLDER};

mod format;
pub use format::TraceFormat;

mod template;
pub use template::PathTemplate;

/// Zero-based index of a worker process within a benchmark.
pub type WorkerIndex = u32;

/// Zero-based index of a benchmark round.
pub type RoundIndex = u32;

/// One recorded timing sample, in milliseconds.
pub type Sample = u64;
