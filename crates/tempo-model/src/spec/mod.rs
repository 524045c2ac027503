mod rate;
pub use rate::RateControlSpec;
