mod context;
pub use context::{RoundBound, RoundContext};

mod message;
pub use message::{RoundMessage, Workload};
