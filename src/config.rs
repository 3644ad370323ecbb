//! Configuration for simulation runs.
//!
//! Models are built in code, but the parameters of a run (stop time,
//! round limit, default signal capacity, logging, statistics, worker
//! threads) can be loaded from YAML or JSON.
//!
//! # Configuration File Structure
//!
//! ```yaml
//! simulation:
//!   name: radar
//!   stop_time: 5000
//!   max_rounds: 100000
//!   default_capacity: 64
//!   log_level: debug
//!   collect_stats: true
//!   threads: 4
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::types::{SimTime, END_OF_TIME};

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Parameters of a simulation run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Model name, used in statistics
    #[serde(default)]
    pub name: String,

    /// Timed processes whose local time passes this are parked
    #[serde(default = "default_stop_time")]
    pub stop_time: SimTime,

    /// Upper bound on scheduling rounds
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u64,

    /// Capacity of signals created through the simulation (None = unbounded)
    #[serde(default)]
    pub default_capacity: Option<usize>,

    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to collect detailed statistics
    #[serde(default)]
    pub collect_stats: bool,

    /// Worker threads for parallel rounds (0 = auto)
    #[serde(default)]
    pub threads: usize,
}

fn default_stop_time() -> SimTime {
    END_OF_TIME
}

fn default_max_rounds() -> u64 {
    100_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            name: String::new(),
            stop_time: default_stop_time(),
            max_rounds: default_max_rounds(),
            default_capacity: None,
            log_level: default_log_level(),
            collect_stats: false,
            threads: 0,
        }
    }
}

impl SimulationParams {
    /// Validates the parameters.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_rounds == 0 {
            return Err(ConfigError::Validation(
                "max_rounds must be greater than 0".to_string(),
            ));
        }
        if self.default_capacity == Some(0) {
            return Err(ConfigError::Validation(
                "default_capacity must be greater than 0".to_string(),
            ));
        }
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::Validation(format!(
                "Unknown log level: {}",
                self.log_level
            )));
        }
        if self.threads > 1 && !cfg!(feature = "parallel") {
            tracing::warn!(
                "threads = {} requested but the `parallel` feature is disabled (ignored)",
                self.threads
            );
        }
        Ok(())
    }
}

/// Complete simulation configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SimConfig {
    /// Run parameters
    #[serde(default)]
    pub simulation: SimulationParams,
}

impl SimConfig {
    /// Creates a configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: SimConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Loads configuration from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file, auto-detecting format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            _ => Err(ConfigError::UnknownFormat(ext.to_string())),
        }
    }

    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.simulation.validate()
    }

    /// Saves configuration to a YAML file.
    pub fn to_yaml_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Saves configuration to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Converts to YAML string.
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Converts to JSON string.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for creating SimConfig programmatically.
#[derive(Default)]
pub struct SimConfigBuilder {
    config: SimConfig,
}

impl SimConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the model name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.simulation.name = name.into();
        self
    }

    /// Sets the stop time.
    pub fn stop_time(mut self, time: SimTime) -> Self {
        self.config.simulation.stop_time = time;
        self
    }

    /// Sets the round limit.
    pub fn max_rounds(mut self, rounds: u64) -> Self {
        self.config.simulation.max_rounds = rounds;
        self
    }

    /// Bounds signals created through the simulation.
    pub fn default_capacity(mut self, capacity: usize) -> Self {
        self.config.simulation.default_capacity = Some(capacity);
        self
    }

    /// Sets the log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.simulation.log_level = level.into();
        self
    }

    /// Enables statistics collection.
    pub fn collect_stats(mut self, enable: bool) -> Self {
        self.config.simulation.collect_stats = enable;
        self
    }

    /// Sets the number of worker threads.
    pub fn threads(mut self, threads: usize) -> Self {
        self.config.simulation.threads = threads;
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> ConfigResult<SimConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimConfig::new();
        assert_eq!(config.simulation.stop_time, END_OF_TIME);
        assert_eq!(config.simulation.max_rounds, 100_000);
        assert_eq!(config.simulation.default_capacity, None);
        assert_eq!(config.simulation.log_level, "info");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
simulation:
  name: radar
  stop_time: 5000
  default_capacity: 16
  log_level: debug
  collect_stats: true
"#;
        let config = SimConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.simulation.name, "radar");
        assert_eq!(config.simulation.stop_time, 5000);
        assert_eq!(config.simulation.default_capacity, Some(16));
        assert!(config.simulation.collect_stats);
        assert_eq!(config.simulation.max_rounds, 100_000);
    }

    #[test]
    fn test_json_parsing() {
        let json = r#"{ "simulation": { "stop_time": 1000, "max_rounds": 50 } }"#;
        let config = SimConfig::from_json(json).unwrap();
        assert_eq!(config.simulation.stop_time, 1000);
        assert_eq!(config.simulation.max_rounds, 50);
    }

    #[test]
    fn test_builder() {
        let config = SimConfigBuilder::new()
            .name("mp3")
            .stop_time(2000)
            .max_rounds(10)
            .default_capacity(8)
            .collect_stats(true)
            .build()
            .unwrap();
        assert_eq!(config.simulation.stop_time, 2000);
        assert_eq!(config.simulation.max_rounds, 10);
        assert_eq!(config.simulation.default_capacity, Some(8));
    }

    #[test]
    fn test_validation_errors() {
        assert!(SimConfigBuilder::new().max_rounds(0).build().is_err());
        assert!(SimConfigBuilder::new().default_capacity(0).build().is_err());
        assert!(SimConfig::from_yaml("simulation:\n  log_level: loud\n").is_err());
    }

    #[test]
    fn test_unknown_format() {
        let result = SimConfig::from_file("model.toml");
        assert!(matches!(result, Err(ConfigError::UnknownFormat(_))));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = SimConfigBuilder::new().stop_time(42).build().unwrap();
        let yaml = config.to_yaml().unwrap();
        let restored = SimConfig::from_yaml(&yaml).unwrap();
        assert_eq!(restored.simulation.stop_time, 42);

        let json = config.to_json().unwrap();
        let restored = SimConfig::from_json(&json).unwrap();
        assert_eq!(restored.simulation.stop_time, 42);
    }
}
