//! Engine configuration file.
//!
//! ```toml
//! sample_rate = 48000
//! quantum_size = 128
//!
//! [limits]
//! max_channel_count = 32
//! max_wire_array_len = 1048576
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use std::path::Path;

use aural_graph::limits::{DEFAULT_QUANTUM_SIZE, DEFAULT_SAMPLE_RATE};
use aural_graph::{CompileLimits, RenderSettings};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::validation::{ValidationResult, validate_engine_config};

/// Settings the compiler and render loop run with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Frames per render quantum.
    pub quantum_size: usize,
    /// Safety limits applied while compiling and decoding.
    pub limits: CompileLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE as u32,
            quantum_size: DEFAULT_QUANTUM_SIZE,
            limits: CompileLimits::default(),
        }
    }
}

impl EngineConfig {
    /// Loads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a configuration from a TOML string without validating it.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Converts the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Saves the configuration, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Checks every field; see [`validate_engine_config`].
    pub fn validate(&self) -> ValidationResult<()> {
        validate_engine_config(self)
    }

    /// Settings handed to the graph controller.
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            sample_rate: self.sample_rate as f32,
            quantum_size: self.quantum_size,
            limits: self.limits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.sample_rate, 48_000);
        assert_eq!(config.quantum_size, 128);
        assert_eq!(config.limits.max_channel_count, 32);
        assert_eq!(config.limits.max_wire_array_len, 1 << 20);
    }

    #[test]
    fn partial_limits_table() {
        let config = EngineConfig::from_toml(
            r#"
            quantum_size = 256

            [limits]
            max_channel_count = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.quantum_size, 256);
        assert_eq!(config.limits.max_channel_count, 8);
        assert_eq!(config.limits.max_wire_array_len, 1 << 20);
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = EngineConfig {
            sample_rate: 44_100,
            quantum_size: 512,
            ..EngineConfig::default()
        };
        config.limits.max_wire_array_len = 4096;
        let text = config.to_toml().unwrap();
        assert_eq!(EngineConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = EngineConfig::from_toml("sample_rate = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn render_settings_mirror_config() {
        let config = EngineConfig {
            sample_rate: 96_000,
            quantum_size: 64,
            ..EngineConfig::default()
        };
        let settings = config.render_settings();
        assert_eq!(settings.sample_rate, 96_000.0);
        assert_eq!(settings.quantum_size, 64);
        assert_eq!(settings.limits, config.limits);
    }
}
