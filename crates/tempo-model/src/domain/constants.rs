//! Placeholders recognised inside trace path templates.

/// Replaced with the worker (client) index.
pub const CLIENT_PLACEHOLDER: &str = "<C>";

/// Replaced with the round index.
pub const ROUND_PLACEHOLDER: &str = "<R>";
