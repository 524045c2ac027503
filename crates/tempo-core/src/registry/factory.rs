use std::sync::Arc;

use tempo_model::{RateControlSpec, RoundContext};
use thiserror::Error;

use crate::{controller::RateController, error::CoreError, registry::ControllerRegistry};

/// Constructor for one rate-control policy type.
///
/// A factory is responsible for:
/// - naming the policy type it serves (`name`)
/// - validating the spec options and building a fresh controller for one round (`build`)
pub trait ControllerFactory: Send + Sync {
    /// Policy type name matched against [`RateControlSpec::kind`].
    fn name(&self) -> &str;

    /// Build a controller for the given spec.
    ///
    /// The registry is passed in so decorators can resolve nested specs recursively;
    /// shared dependencies are reachable through [`ControllerRegistry::ctx`].
    fn build(
        &self,
        spec: &RateControlSpec,
        round: &RoundContext,
        registry: &ControllerRegistry,
    ) -> Result<Box<dyn RateController>, CoreError>;
}

/// Fallback hook consulted when no built-in factory matches a type name.
pub trait ControllerLoader: Send + Sync {
    /// Loader name used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Look up a factory for `type_name`.
    ///
    /// Returns `Ok(None)` when this loader does not know the name and
    /// `Err` when an artifact was found but cannot be used.
    fn load(&self, type_name: &str) -> Result<Option<Arc<dyn ControllerFactory>>, LoaderError>;
}

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("invalid controller name: {0}")]
    InvalidName(String),

    #[error("failed to load {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("missing entry symbol `{symbol}` in {path}")]
    MissingSymbol { symbol: String, path: String },

    #[error("abi version mismatch: plugin={plugin}, host={host}")]
    AbiMismatch { plugin: u32, host: u32 },
}
