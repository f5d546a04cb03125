//! Command-line interface for the feed generator.
//!
//! Flags map one-to-one onto [`GeneratorConfig`] fields. Parsing and
//! range validation both happen before the first record is generated,
//! so a bad flag value fails the process immediately.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::infrastructure::config::{
    ConfigError, FeedSettings, GeneratorConfig, OutputSettings, TcpSettings,
};

/// Synthetic TRACE-style trade report generator.
#[derive(Debug, Parser)]
#[command(name = "trace-feed-generator")]
#[command(about = "Emits synthetic corporate bond trade reports as JSON lines", long_about = None)]
pub struct Cli {
    /// Steady-state records per second
    #[arg(long, default_value_t = 1.0)]
    pub rate: f64,

    /// Random jitter applied to the steady interval, as a fraction of it (0.0-1.0)
    #[arg(long, default_value_t = 0.0)]
    pub rate_jitter: f64,

    /// Serve records over TCP instead of only printing them
    #[arg(long)]
    pub tcp: bool,

    /// Generate opposite-side pair legs for some records
    #[arg(long)]
    pub pairs: bool,

    /// Chance of a pair leg per record when --pairs is set (0.0-1.0)
    #[arg(long = "pair-prob", default_value_t = 0.3)]
    pub pair_probability: f64,

    /// Host the TCP feed server binds to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port the TCP feed server binds to
    #[arg(long, default_value_t = 5555)]
    pub port: u16,

    /// Records per burst; zero disables burst mode
    #[arg(long = "burst", default_value_t = 0)]
    pub burst_size: u32,

    /// Seconds between bursts
    #[arg(long, default_value_t = 60)]
    pub burst_interval: u64,

    /// Also append each record to this file
    #[arg(long)]
    pub out_file: Option<PathBuf>,
}

impl Cli {
    /// Converts parsed flags into a validated [`GeneratorConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] when a flag value is out
    /// of its legal range.
    pub fn into_config(self) -> Result<GeneratorConfig, ConfigError> {
        let config = GeneratorConfig {
            feed: FeedSettings {
                rate: self.rate,
                rate_jitter: self.rate_jitter,
                pairs: self.pairs,
                pair_probability: self.pair_probability,
                burst_size: self.burst_size,
                burst_interval: Duration::from_secs(self.burst_interval),
            },
            tcp: TcpSettings {
                enabled: self.tcp,
                host: self.host,
                port: self.port,
            },
            output: OutputSettings {
                out_file: self.out_file,
            },
        };
        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Tests
// =============================================================================
