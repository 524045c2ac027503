//! Externally supplied rate controllers.
//!
//! Plugins are shared libraries exporting a C ABI (see [`abi`]). The host side
//! ([`LibraryLoader`], feature `dylib`) plugs into the registry as a [`crate::ControllerLoader`].
pub mod abi;

#[cfg(feature = "dylib")]
mod library;
#[cfg(feature = "dylib")]
pub use library::LibraryLoader;
