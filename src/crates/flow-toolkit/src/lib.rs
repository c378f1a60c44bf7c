//! Shared ambient utilities for the workflow execution core.
//!
//! # Modules
//!
//! - `config` - environment-driven configuration with typed accessors and defaults
//! - `error` - error context chaining utilities shared across the workspace
//! - `logging` - structured logging helpers built on `tracing`
//! - `pty` - pseudo-terminal command execution with sudo credential injection

pub mod config;
pub mod error;
pub mod logging;
pub mod pty;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur in the toolkit crate.
#[derive(Debug, Error)]
pub enum ToolingError {
    /// General error with message.
    #[error("toolkit error: {0}")]
    General(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for toolkit operations.
pub type Result<T> = std::result::Result<T, ToolingError>;

/// Basic toolkit-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolingConfig {
    /// Enable verbose logging.
    pub verbose: bool,
}

impl Default for ToolingConfig {
    fn default() -> Self {
        Self { verbose: false }
    }
}

/// Get version information.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ToolingConfig::default();
        assert!(!config.verbose);
    }

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
