//! Configuration loading and typed config structures for the engine.
//!
//! The canonical configuration lives in `vivarium-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror
//! the YAML structure, and provides a loader that reads and validates
//! the file. A missing file or section falls back to defaults.

use std::path::Path;

use serde::Deserialize;

use vivarium_modules::TimeSettings;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
///
/// Mirrors the structure of `vivarium-config.yaml`. All fields have
/// defaults, so an empty file (or no file) yields a runnable engine.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// World-level settings (name).
    #[serde(default)]
    pub world: WorldConfig,

    /// Time module settings.
    #[serde(default)]
    pub time: TimeSettings,

    /// Chronicle module settings.
    #[serde(default)]
    pub chronicle: ChronicleConfig,

    /// Scheduler boundary settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yml::from_str(&contents)?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable runtime name.
    #[serde(default = "default_world_name")]
    pub name: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
        }
    }
}

fn default_world_name() -> String {
    String::from("vivarium")
}

/// Chronicle module configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ChronicleConfig {
    /// Log a chronicle checkpoint every this many rounds (0 disables).
    #[serde(default = "default_checkpoint_every")]
    pub checkpoint_every: u64,
}

impl Default for ChronicleConfig {
    fn default() -> Self {
        Self {
            checkpoint_every: default_checkpoint_every(),
        }
    }
}

const fn default_checkpoint_every() -> u64 {
    60
}

/// Scheduler boundary configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct SchedulerConfig {
    /// Maximum rounds to execute (0 = run until shutdown).
    #[serde(default)]
    pub max_rounds: u64,
}
