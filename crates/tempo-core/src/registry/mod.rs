//! Controller registry that turns a `RateControlSpec` into a live `RateController`.
//!
//! Resolution checks the built-in factory table first and then asks every registered
//! [`ControllerLoader`] in registration order. The registry is assembled once at worker
//! startup and only read afterwards.
mod factory;
pub use factory::{ControllerFactory, ControllerLoader, LoaderError};

use std::{collections::HashMap, sync::Arc};

use tempo_model::{RateControlSpec, RoundContext};
use tracing::{debug, instrument, trace, warn};

use crate::{controller::BuildContext, controller::RateController, error::CoreError};

/// Name-indexed table of controller factories plus fallback loaders.
#[derive(Default)]
pub struct ControllerRegistry {
    factories: HashMap<String, Arc<dyn ControllerFactory>>,
    loaders: Vec<Arc<dyn ControllerLoader>>,
    ctx: BuildContext,
}

impl ControllerRegistry {
    /// Create an empty registry with a default build context.
    #[inline]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            loaders: Vec::new(),
            ctx: BuildContext::default(),
        }
    }

    /// Set the build context shared by all factories.
    ///
    /// This injects the statistics source, metrics backend, cancellation token and trace root.
    #[inline]
    pub fn with_context(mut self, ctx: BuildContext) -> Self {
        self.ctx = ctx;
        self
    }

    /// Shared build context.
    #[inline]
    pub fn ctx(&self) -> &BuildContext {
        &self.ctx
    }

    /// Register a built-in factory under its own name.
    ///
    /// Names are unique; registering the same name twice is an error.
    pub fn register(&mut self, factory: Arc<dyn ControllerFactory>) -> Result<(), CoreError> {
        let name = factory.name().to_string();
        if self.factories.contains_key(&name) {
            return Err(CoreError::DuplicateController(name));
        }
        trace!(controller = %name, "registered controller factory");
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Append a fallback loader for names missing from the built-in table.
    #[inline]
    pub fn register_loader(&mut self, loader: Arc<dyn ControllerLoader>) {
        self.loaders.push(loader);
    }

    /// Returns `true` if a built-in factory is registered for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Sorted names of all built-in factories.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Find the factory responsible for `name`.
    ///
    /// Lookup rules:
    /// - empty names never resolve;
    /// - exact match in the built-in table wins;
    /// - otherwise the first loader returning a factory wins;
    /// - a loader error stops the lookup and is reported as a resolution failure.
    pub fn find(&self, name: &str) -> Result<Arc<dyn ControllerFactory>, CoreError> {
        let unresolved = |reason: String| CoreError::Resolution {
            name: name.to_string(),
            reason,
        };

        if name.trim().is_empty() {
            return Err(unresolved("empty controller type".into()));
        }
        if let Some(factory) = self.factories.get(name) {
            return Ok(Arc::clone(factory));
        }
        for loader in &self.loaders {
            match loader.load(name) {
                Ok(Some(factory)) => {
                    debug!(controller = name, loader = loader.name(), "controller provided by loader");
                    return Ok(factory);
                }
                Ok(None) => continue,
                Err(e) => {
                    warn!(controller = name, loader = loader.name(), error = %e, "controller loader failed");
                    return Err(unresolved(e.to_string()));
                }
            }
        }
        Err(unresolved("no built-in controller or loadable module with this name".into()))
    }

    /// Resolve a spec into a fully constructed controller.
    ///
    /// Nested specs inside `spec.opts` are resolved by the owning factory through this same method.
    #[instrument(level = "debug", skip(self, spec, round), fields(controller = %spec.kind, worker = round.worker_index(), round = round.round_index()))]
    pub fn resolve(
        &self,
        spec: &RateControlSpec,
        round: &RoundContext,
    ) -> Result<Box<dyn RateController>, CoreError> {
        let factory = self.find(&spec.kind).inspect_err(|e| {
            self.ctx.metrics().record_controller_error(&spec.kind, e.kind());
        })?;

        match factory.build(spec, round, self) {
            Ok(controller) => {
                debug!("controller built");
                Ok(controller)
            }
            Err(e) => {
                // Nested resolution failures were already counted by the inner call.
                if !matches!(e, CoreError::Resolution { .. }) {
                    self.ctx.metrics().record_controller_error(&spec.kind, e.kind());
                }
                Err(e)
            }
        }
    }

    /// Resolve the top-level policy of a round.
    pub fn resolve_round(&self, round: &RoundContext) -> Result<Box<dyn RateController>, CoreError> {
        self.resolve(round.rate_control(), round)
    }
}
