//! Configuration module
//!
//! This module provides the upload configuration: accepted formats and size limit,
//! progress simulation timing, processing simulation, and event fan-out. Values come
//! from the environment (optionally via a `.env` file) with defaults matching the
//! desktop application.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    BYTES_PER_MB, EVENT_CAPACITY, INITIAL_ESTIMATE_MS, MAX_FILE_SIZE_MB, MAX_PROGRESS_INCREMENT,
    METADATA_DELAY_MS, MIN_PROGRESS_INCREMENT, MONITOR_INTERVAL_SECS, PROCESSING_DELAY_MS,
    SUPPORTED_FORMATS, TICK_INTERVAL_MS,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got '{value}'")]
    Parse {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Constraints a candidate file must satisfy before a session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConstraints {
    /// Lower-cased declared types, in configured order without duplicates.
    pub accepted_types: Vec<String>,
    pub max_size_bytes: u64,
}

impl ValidationConstraints {
    pub fn new<I, S>(accepted_types: I, max_size_bytes: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut types: Vec<String> = Vec::new();
        for declared in accepted_types {
            let declared = declared.as_ref().trim().to_lowercase();
            if !declared.is_empty() && !types.contains(&declared) {
                types.push(declared);
            }
        }

        Self {
            accepted_types: types,
            max_size_bytes,
        }
    }

    /// Whether an already normalized declared type is accepted.
    pub fn accepts(&self, declared: &str) -> bool {
        self.accepted_types.iter().any(|t| t == declared)
    }
}

impl Default for ValidationConstraints {
    fn default() -> Self {
        Self::new(SUPPORTED_FORMATS.iter(), MAX_FILE_SIZE_MB * BYTES_PER_MB)
    }
}

/// Timing and fan-out settings of the upload controller.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleConfig {
    pub tick_interval: Duration,
    pub min_increment: f64,
    pub max_increment: f64,
    /// Remaining-time estimate reported before the first progress sample.
    pub initial_estimate: Duration,
    pub event_capacity: usize,
    pub rng_seed: Option<u64>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(TICK_INTERVAL_MS),
            min_increment: MIN_PROGRESS_INCREMENT,
            max_increment: MAX_PROGRESS_INCREMENT,
            initial_estimate: Duration::from_millis(INITIAL_ESTIMATE_MS),
            event_capacity: EVENT_CAPACITY,
            rng_seed: None,
        }
    }
}

impl LifecycleConfig {
    /// Reject timing settings under which a session could never finish.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "tick interval must be greater than zero".to_string(),
            ));
        }

        if !self.min_increment.is_finite()
            || !self.max_increment.is_finite()
            || self.min_increment < 0.0
            || self.max_increment <= 0.0
            || self.min_increment > self.max_increment
        {
            return Err(ConfigError::Invalid(format!(
                "progress increments must satisfy 0 <= min <= max and max > 0 (min: {}, max: {})",
                self.min_increment, self.max_increment
            )));
        }

        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid(
                "event capacity must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Settings of the simulated metadata extractor and processing stage.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub metadata_delay: Duration,
    pub processing_delay: Duration,
    /// Probability in `0.0..=1.0` that simulated processing fails.
    pub processing_failure_rate: f64,
    pub rng_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            metadata_delay: Duration::from_millis(METADATA_DELAY_MS),
            processing_delay: Duration::from_millis(PROCESSING_DELAY_MS),
            processing_failure_rate: 0.0,
            rng_seed: None,
        }
    }
}

/// Upload configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadConfig {
    pub accepted_types: Vec<String>,
    pub max_file_size_bytes: u64,
    pub tick_interval_ms: u64,
    pub min_increment: f64,
    pub max_increment: f64,
    pub processing_delay_ms: u64,
    pub metadata_delay_ms: u64,
    pub initial_estimate_ms: u64,
    pub processing_failure_rate: f64,
    pub event_capacity: usize,
    pub rng_seed: Option<u64>,
    pub monitor_interval_secs: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            accepted_types: SUPPORTED_FORMATS.iter().map(|s| s.to_string()).collect(),
            max_file_size_bytes: MAX_FILE_SIZE_MB * BYTES_PER_MB,
            tick_interval_ms: TICK_INTERVAL_MS,
            min_increment: MIN_PROGRESS_INCREMENT,
            max_increment: MAX_PROGRESS_INCREMENT,
            processing_delay_ms: PROCESSING_DELAY_MS,
            metadata_delay_ms: METADATA_DELAY_MS,
            initial_estimate_ms: INITIAL_ESTIMATE_MS,
            processing_failure_rate: 0.0,
            event_capacity: EVENT_CAPACITY,
            rng_seed: None,
            monitor_interval_secs: MONITOR_INTERVAL_SECS,
        }
    }
}

fn env_or<T: FromStr>(
    key: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => {
            value.trim().parse().map_err(|_| ConfigError::Parse {
                key,
                value,
                expected,
            })
        }
        _ => Ok(default),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl UploadConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let accepted_types = env::var("FRAME_EVOLVE_ACCEPTED_TYPES")
            .map(|s| parse_list(&s))
            .unwrap_or(defaults.accepted_types);

        let rng_seed = match env::var("FRAME_EVOLVE_RNG_SEED") {
            Ok(s) if !s.trim().is_empty() => {
                Some(s.trim().parse().map_err(|_| ConfigError::Parse {
                    key: "FRAME_EVOLVE_RNG_SEED",
                    value: s,
                    expected: "an unsigned integer",
                })?)
            }
            _ => None,
        };

        let config = UploadConfig {
            accepted_types,
            max_file_size_bytes: env_or(
                "FRAME_EVOLVE_MAX_FILE_SIZE_MB",
                MAX_FILE_SIZE_MB,
                "a size in megabytes",
            )?
            .saturating_mul(BYTES_PER_MB),
            tick_interval_ms: env_or(
                "FRAME_EVOLVE_TICK_INTERVAL_MS",
                defaults.tick_interval_ms,
                "a duration in milliseconds",
            )?,
            min_increment: env_or(
                "FRAME_EVOLVE_MIN_INCREMENT",
                defaults.min_increment,
                "a percentage",
            )?,
            max_increment: env_or(
                "FRAME_EVOLVE_MAX_INCREMENT",
                defaults.max_increment,
                "a percentage",
            )?,
            processing_delay_ms: env_or(
                "FRAME_EVOLVE_PROCESSING_DELAY_MS",
                defaults.processing_delay_ms,
                "a duration in milliseconds",
            )?,
            metadata_delay_ms: env_or(
                "FRAME_EVOLVE_METADATA_DELAY_MS",
                defaults.metadata_delay_ms,
                "a duration in milliseconds",
            )?,
            initial_estimate_ms: env_or(
                "FRAME_EVOLVE_INITIAL_ESTIMATE_MS",
                defaults.initial_estimate_ms,
                "a duration in milliseconds",
            )?,
            processing_failure_rate: env_or(
                "FRAME_EVOLVE_PROCESSING_FAILURE_RATE",
                defaults.processing_failure_rate,
                "a probability",
            )?,
            event_capacity: env_or(
                "FRAME_EVOLVE_EVENT_CAPACITY",
                defaults.event_capacity,
                "a positive integer",
            )?,
            rng_seed,
            monitor_interval_secs: env_or(
                "FRAME_EVOLVE_MONITOR_INTERVAL_SECS",
                defaults.monitor_interval_secs,
                "a duration in seconds",
            )?,
        };

        config.validate()?;

        tracing::debug!(
            accepted_types = ?config.accepted_types,
            max_file_size_bytes = config.max_file_size_bytes,
            tick_interval_ms = config.tick_interval_ms,
            "Upload configuration loaded"
        );

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.accepted_types.is_empty() {
            return Err(ConfigError::Invalid(
                "FRAME_EVOLVE_ACCEPTED_TYPES must list at least one type".to_string(),
            ));
        }

        if self.max_file_size_bytes == 0 {
            return Err(ConfigError::Invalid(
                "FRAME_EVOLVE_MAX_FILE_SIZE_MB must be greater than zero".to_string(),
            ));
        }

        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "FRAME_EVOLVE_TICK_INTERVAL_MS must be greater than zero".to_string(),
            ));
        }

        if !self.min_increment.is_finite()
            || !self.max_increment.is_finite()
            || self.min_increment < 0.0
            || self.max_increment <= 0.0
            || self.min_increment > self.max_increment
        {
            return Err(ConfigError::Invalid(format!(
                "progress increments must satisfy 0 <= min <= max and max > 0 (min: {}, max: {})",
                self.min_increment, self.max_increment
            )));
        }

        if !(0.0..=1.0).contains(&self.processing_failure_rate) {
            return Err(ConfigError::Invalid(format!(
                "FRAME_EVOLVE_PROCESSING_FAILURE_RATE must be within 0..=1, got {}",
                self.processing_failure_rate
            )));
        }

        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid(
                "FRAME_EVOLVE_EVENT_CAPACITY must be greater than zero".to_string(),
            ));
        }

        if self.monitor_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "FRAME_EVOLVE_MONITOR_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn constraints(&self) -> ValidationConstraints {
        ValidationConstraints::new(&self.accepted_types, self.max_file_size_bytes)
    }

    pub fn lifecycle(&self) -> LifecycleConfig {
        LifecycleConfig {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            min_increment: self.min_increment,
            max_increment: self.max_increment,
            initial_estimate: Duration::from_millis(self.initial_estimate_ms),
            event_capacity: self.event_capacity,
            rng_seed: self.rng_seed,
        }
    }

    pub fn simulation(&self) -> SimulationConfig {
        SimulationConfig {
            metadata_delay: Duration::from_millis(self.metadata_delay_ms),
            processing_delay: Duration::from_millis(self.processing_delay_ms),
            processing_failure_rate: self.processing_failure_rate,
            rng_seed: self.rng_seed,
        }
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.monitor_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = UploadConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_file_size_bytes, 5 * 1024 * 1024 * 1024);
        assert_eq!(config.accepted_types.len(), 8);
    }

    #[test]
    fn test_constraints_normalize_types() {
        let constraints = ValidationConstraints::new([" Video/MP4 ", "", "video/webm"], 10);
        assert_eq!(constraints.accepted_types, vec!["video/mp4", "video/webm"]);
        assert!(constraints.accepts("video/mp4"));
        assert!(!constraints.accepts("video/avi"));
    }

    #[test]
    fn test_constraints_keep_configured_order() {
        let constraints =
            ValidationConstraints::new(["video/webm", "video/MP4", "video/webm", "video/avi"], 10);
        assert_eq!(
            constraints.accepted_types,
            vec!["video/webm", "video/mp4", "video/avi"]
        );

        let defaults = ValidationConstraints::default();
        assert_eq!(defaults.accepted_types.first().map(String::as_str), Some("video/mp4"));
        assert_eq!(defaults.accepted_types.last().map(String::as_str), Some("video/m4v"));
    }

    #[test]
    fn test_lifecycle_validate() {
        assert!(LifecycleConfig::default().validate().is_ok());

        let zero_tick = LifecycleConfig {
            tick_interval: Duration::ZERO,
            ..LifecycleConfig::default()
        };
        assert!(matches!(zero_tick.validate(), Err(ConfigError::Invalid(_))));

        let stalled = LifecycleConfig {
            min_increment: 0.0,
            max_increment: 0.0,
            ..LifecycleConfig::default()
        };
        assert!(stalled.validate().is_err());

        let no_capacity = LifecycleConfig {
            event_capacity: 0,
            ..LifecycleConfig::default()
        };
        assert!(no_capacity.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_types() {
        let config = UploadConfig {
            accepted_types: vec![],
            ..UploadConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_inverted_increments() {
        let config = UploadConfig {
            min_increment: 8.0,
            max_increment: 2.0,
            ..UploadConfig::default()
        };
        assert!(config.validate().is_err());

        let config = UploadConfig {
            min_increment: 0.0,
            max_increment: 0.0,
            ..UploadConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_failure_rate_out_of_range() {
        let config = UploadConfig {
            processing_failure_rate: 1.5,
            ..UploadConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_tick_interval() {
        let config = UploadConfig {
            tick_interval_ms: 0,
            ..UploadConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_derived_configs() {
        let config = UploadConfig {
            tick_interval_ms: 50,
            processing_delay_ms: 700,
            rng_seed: Some(7),
            ..UploadConfig::default()
        };

        let lifecycle = config.lifecycle();
        assert_eq!(lifecycle.tick_interval, Duration::from_millis(50));
        assert_eq!(lifecycle.rng_seed, Some(7));

        let simulation = config.simulation();
        assert_eq!(simulation.processing_delay, Duration::from_millis(700));
        assert_eq!(simulation.rng_seed, Some(7));

        assert_eq!(config.constraints(), ValidationConstraints::default());
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            parse_list("video/MP4, video/webm,,"),
            vec!["video/mp4".to_string(), "video/webm".to_string()]
        );
    }
}
