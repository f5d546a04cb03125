//! Runtime configuration for the feed generator.
//!
//! The CLI layer parses flags into a [`GeneratorConfig`]; the core
//! consumes the validated structure and never re-checks ranges. Defaults
//! here mirror the CLI defaults exactly, so a config built with
//! `Default` behaves like running the binary with no flags.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Generation-loop settings.
#[derive(Debug, Clone)]
pub struct FeedSettings {
    /// Steady-state records per second. Must be positive and finite.
    pub rate: f64,
    /// Uniform jitter applied to the steady interval, as a fraction of
    /// it, in `[0.0, 1.0]`.
    pub rate_jitter: f64,
    /// Whether opposite-side pair legs are generated.
    pub pairs: bool,
    /// Chance of a pair leg per primary record, in `[0.0, 1.0]`.
    pub pair_probability: f64,
    /// Records per burst; zero disables bursting.
    pub burst_size: u32,
    /// Time between bursts.
    pub burst_interval: Duration,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            rate: 1.0,
            rate_jitter: 0.0,
            pairs: false,
            pair_probability: 0.3,
            burst_size: 0,
            burst_interval: Duration::from_secs(60),
        }
    }
}

/// TCP feed server settings.
#[derive(Debug, Clone)]
pub struct TcpSettings {
    /// Whether the TCP feed server runs at all.
    pub enabled: bool,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for TcpSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "127.0.0.1".to_string(),
            port: 5555,
        }
    }
}

/// Output sink settings beyond stdout.
#[derive(Debug, Clone, Default)]
pub struct OutputSettings {
    /// Also append each record to this file.
    pub out_file: Option<PathBuf>,
}

/// Root configuration structure.
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    /// Generation-loop settings.
    pub feed: FeedSettings,
    /// TCP feed server settings.
    pub tcp: TcpSettings,
    /// Output sink settings.
    pub output: OutputSettings,
}

impl GeneratorConfig {
    /// Validates value ranges, failing fast at startup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the offending knob
    /// and its legal range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.feed.rate.is_finite() || self.feed.rate <= 0.0 {
            return Err(ConfigError::ValidationError(
                "rate must be a positive, finite number of records per second".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.feed.rate_jitter) {
            return Err(ConfigError::ValidationError(
                "rate_jitter must be between 0.0 and 1.0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.feed.pair_probability) {
            return Err(ConfigError::ValidationError(
                "pair_probability must be between 0.0 and 1.0".to_string(),
            ));
        }

        Ok(())
    }
}
