pub mod controller;
pub mod error;
pub mod metrics;
pub mod plugin;
pub mod registry;
pub mod stats;

pub use controller::{BuildContext, ControlError, RateController, pace, pace_until};
pub use error::CoreError;
pub use metrics::{MetricsHandle, NoOpMetrics, PacingMetrics, noop_metrics};
pub use registry::{ControllerFactory, ControllerLoader, ControllerRegistry, LoaderError};
pub use stats::{NoopStats, StatsCollector, StatsHandle, TxStats, noop_stats};

pub mod prelude {
    pub use crate::controller::{BuildContext, ControlError, RateController};
    pub use crate::error::CoreError;
    pub use crate::registry::{ControllerFactory, ControllerRegistry};
    pub use crate::stats::StatsCollector;
}
