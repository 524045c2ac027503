//! Typed option structures for the built-in controllers.
//!
//! Each structure mirrors the `opts` object of a [`crate::RateControlSpec`] and is
//! deserialized by the owning controller factory via [`crate::RateControlSpec::parse_opts`].
mod composite;
pub use composite::CompositeRateOpts;

mod fixed;
pub use fixed::{FixedLoadOpts, FixedRateOpts, LinearRateOpts};

mod trace;
pub use trace::{RecordRateOpts, ReplayRateOpts};
