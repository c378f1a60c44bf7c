//! Version information for the HTTP surface.

/// Version string for the flow-server crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
