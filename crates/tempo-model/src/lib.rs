mod domain;
pub use domain::{CLIENT_PLACEHOLDER, ROUND_PLACEHOLDER};
pub use domain::{PathTemplate, RoundIndex, Sample, TraceFormat, WorkerIndex};

mod error;
pub use error::{ModelError, ModelResult};

mod options;
pub use options::{
    CompositeRateOpts, FixedLoadOpts, FixedRateOpts, LinearRateOpts, RecordRateOpts,
    ReplayRateOpts,
};

mod round;
pub use round::{RoundBound, RoundContext, RoundMessage, Workload};

mod spec;
pub use spec::RateControlSpec;
