//! Logging setup shared by tempo binaries.
mod logger;
pub use logger::*;
