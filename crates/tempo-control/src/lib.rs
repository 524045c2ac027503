//! Built-in rate-control policies.
//!
//! Every policy is exposed as a [`ControllerFactory`](tempo_core::ControllerFactory)
//! registered under its type name by [`register_builtin_controllers`].
mod composite;
mod fixed_load;
mod fixed_rate;
mod linear_rate;
mod no_rate;
mod schedule;
mod zero_rate;

pub use composite::{COMPOSITE_RATE, CompositeRate, CompositeRateFactory};
pub use fixed_load::{FIXED_LOAD, FixedLoad, FixedLoadFactory};
pub use fixed_rate::{FIXED_RATE, FixedRate, FixedRateFactory};
pub use linear_rate::{LINEAR_RATE, LinearRate, LinearRateFactory};
pub use no_rate::{NO_RATE, NoRate, NoRateFactory};
pub use zero_rate::{ZERO_RATE, ZeroRate, ZeroRateFactory};

use std::sync::Arc;

use tempo_core::{ControllerRegistry, CoreError};

/// Register every built-in policy in the given registry.
///
/// After this call the registry resolves `no-rate`, `zero-rate`, `fixed-rate`,
/// `linear-rate`, `fixed-load` and `composite-rate`.
pub fn register_builtin_controllers(registry: &mut ControllerRegistry) -> Result<(), CoreError> {
    registry.register(Arc::new(NoRateFactory))?;
    registry.register(Arc::new(ZeroRateFactory))?;
    registry.register(Arc::new(FixedRateFactory))?;
    registry.register(Arc::new(LinearRateFactory))?;
    registry.register(Arc::new(FixedLoadFactory))?;
    registry.register(Arc::new(CompositeRateFactory))?;
    Ok(())
}
