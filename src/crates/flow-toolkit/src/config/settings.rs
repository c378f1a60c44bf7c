//! Run-wide settings loaded from the environment.
//!
//! Every field has a documented default so the system runs with zero
//! configuration in development; production deployments override individual
//! variables without needing a config file.

use super::env::{get_env_or, get_env_parse_or};
use crate::Result;
use std::time::Duration;

/// Default cap on full executor re-constructions triggered by a restart signal.
pub const DEFAULT_MAX_WORKFLOW_RESTARTS: u32 = 3;
/// Default cap on ReAct agent reasoning iterations.
pub const DEFAULT_REACT_AGENT_MAX_STEPS: u32 = 5;
/// Default TTL, in seconds, for ReAct agent memory documents.
pub const DEFAULT_MEMORY_TTL_SECS: u64 = 86_400;
/// Default capacity of each event-bus subscriber channel.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;
/// Default bind address for the HTTP/socket surface.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Run-wide settings shared by the executor, the built-in node types, and the
/// HTTP surface.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Maximum number of full executor restarts permitted per run.
    pub max_workflow_restarts: u32,
    /// Maximum ReAct agent reasoning iterations before giving up.
    pub react_agent_max_steps: u32,
    /// TTL applied to ReAct agent memory documents.
    pub memory_ttl: Duration,
    /// Per-subscriber event channel capacity.
    pub event_channel_capacity: usize,
    /// Address the HTTP/socket surface binds to.
    pub bind_addr: String,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_workflow_restarts: DEFAULT_MAX_WORKFLOW_RESTARTS,
            react_agent_max_steps: DEFAULT_REACT_AGENT_MAX_STEPS,
            memory_ttl: Duration::from_secs(DEFAULT_MEMORY_TTL_SECS),
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl RunSettings {
    /// Load settings from the environment, falling back to documented defaults
    /// for any variable that is unset or fails to parse cleanly.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            max_workflow_restarts: get_env_parse_or(
                "MAX_WORKFLOW_RESTARTS",
                defaults.max_workflow_restarts,
            )?,
            react_agent_max_steps: get_env_parse_or(
                "REACT_AGENT_MAX_STEPS",
                defaults.react_agent_max_steps,
            )?,
            memory_ttl: Duration::from_secs(get_env_parse_or(
                "MEMORY_TTL_SECONDS",
                DEFAULT_MEMORY_TTL_SECS,
            )?),
            event_channel_capacity: get_env_parse_or(
                "EVENT_CHANNEL_CAPACITY",
                defaults.event_channel_capacity,
            )?,
            bind_addr: get_env_or("BIND_ADDR", defaults.bind_addr)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = RunSettings::default();
        assert_eq!(settings.max_workflow_restarts, 3);
        assert_eq!(settings.react_agent_max_steps, 5);
        assert_eq!(settings.memory_ttl, Duration::from_secs(86_400));
        assert_eq!(settings.bind_addr, "127.0.0.1:8080");
    }

    #[test]
    fn from_env_falls_back_when_unset() {
        std::env::remove_var("MAX_WORKFLOW_RESTARTS");
        let settings = RunSettings::from_env().unwrap();
        assert_eq!(settings.max_workflow_restarts, 3);
    }

    #[test]
    fn from_env_honors_override() {
        std::env::set_var("REACT_AGENT_MAX_STEPS", "9");
        let settings = RunSettings::from_env().unwrap();
        assert_eq!(settings.react_agent_max_steps, 9);
        std::env::remove_var("REACT_AGENT_MAX_STEPS");
    }
}
