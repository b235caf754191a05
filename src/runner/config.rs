//! Simulator configuration.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_MAX_CALL_DEPTH: usize = 128;
/// Highest accepted `max_call_depth`. Every simulated frame costs several
/// host frames, so the bound has to trip well before the host stack does.
pub const MAX_CALL_DEPTH_LIMIT: usize = 256;
pub const DEFAULT_GLOBAL_FRAME_NAME: &str = "Global";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Limits and naming used by a simulation run.
///
/// Expected TOML format, every key optional:
/// ```toml
/// max_call_depth = 64
/// max_steps = 10000
/// global_frame_name = "Global"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulatorConfig {
    /// Maximum number of frames on the call stack, global frame included.
    pub max_call_depth: usize,
    /// Maximum number of non-halting steps in a trace.
    pub max_steps: Option<usize>,
    pub global_frame_name: String,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_steps: None,
            global_frame_name: DEFAULT_GLOBAL_FRAME_NAME.to_string(),
        }
    }
}

impl SimulatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = Some(steps);
        self
    }

    pub fn with_global_frame_name(mut self, name: impl Into<String>) -> Self {
        self.global_frame_name = name.into();
        self
    }

    /// The call depth bound actually enforced, clamped to
    /// [`MAX_CALL_DEPTH_LIMIT`] for configs built without [`validate`].
    ///
    /// [`validate`]: SimulatorConfig::validate
    pub fn call_depth_limit(&self) -> usize {
        self.max_call_depth.min(MAX_CALL_DEPTH_LIMIT)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: SimulatorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_call_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_call_depth must leave room for the global frame".to_string(),
            ));
        }
        if self.max_call_depth > MAX_CALL_DEPTH_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_call_depth must not exceed {}",
                MAX_CALL_DEPTH_LIMIT
            )));
        }
        if self.global_frame_name.is_empty() {
            return Err(ConfigError::Invalid(
                "global_frame_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SimulatorConfig::parse("").unwrap();
        assert_eq!(config, SimulatorConfig::default());
        assert_eq!(config.max_call_depth, 128);
        assert_eq!(config.max_steps, None);
    }

    #[test]
    fn test_parse_overrides() {
        let config = SimulatorConfig::parse("max_call_depth = 4\nmax_steps = 50\n").unwrap();
        assert_eq!(config.max_call_depth, 4);
        assert_eq!(config.max_steps, Some(50));
        assert_eq!(config.global_frame_name, "Global");
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            SimulatorConfig::parse("max_call_depth = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SimulatorConfig::parse("unknown_key = 1"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_rejects_call_depth_above_limit() {
        assert!(matches!(
            SimulatorConfig::parse("max_call_depth = 10000000"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(SimulatorConfig::parse("max_call_depth = 256").is_ok());

        let config = SimulatorConfig::new().with_max_call_depth(10_000_000);
        assert!(config.validate().is_err());
        assert_eq!(config.call_depth_limit(), MAX_CALL_DEPTH_LIMIT);
        assert!(SimulatorConfig::new().with_max_call_depth(0).validate().is_err());
    }

    #[test]
    fn test_builders() {
        let config = SimulatorConfig::new()
            .with_max_call_depth(3)
            .with_max_steps(10)
            .with_global_frame_name("main");
        assert_eq!(config.max_call_depth, 3);
        assert_eq!(config.max_steps, Some(10));
        assert_eq!(config.global_frame_name, "main");
    }
}
