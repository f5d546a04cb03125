#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::items_after_statements,
        clippy::default_trait_access
    )
)]

//! TRACE Feed Generator - Synthetic Trade Report Stream
//!
//! Generates a continuous stream of plausible corporate bond trade
//! reports (TRACE-style) as newline-delimited JSON, for exercising
//! downstream feed handlers without touching a real market data vendor.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Record types and identifier rules with no I/O
//!   - `cusip`: CUSIP check digit arithmetic and random identifiers
//!   - `trade`: Trade report records and per-field generation
//!
//! - **Application**: The generation pipeline
//!   - `emitter`: Generation loop driving pacing, pairing, and fan-out
//!   - `pairing`: Opposite-side pair leg construction
//!   - `ports`: Sink interface the loop writes through
//!   - `queue`: Bounded delivery queue feeding the TCP path
//!   - `scheduler`: Steady-rate and burst pacing decisions
//!
//! - **Infrastructure**: Adapters and process plumbing
//!   - `config`: Validated runtime configuration
//!   - `sink`: Stdout, file, and in-memory record sinks
//!   - `tcp`: Single-client TCP feed server
//!   - `telemetry`: Tracing setup (diagnostics go to stderr)
//!
//! # Data Flow
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐
//! │ TradeEmitter │────►│ RecordSinks │──► stdout / --out-file
//! └──────┬───────┘     └─────────────┘
//!        │
//!        │ --tcp       ┌─────────────┐     ┌───────────────┐
//!        └────────────►│  FeedQueue  │────►│ TcpFeedServer │──► client
//!                      └─────────────┘     └───────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Record types and identifier rules with no I/O.
pub mod domain;

/// Application layer - The generation pipeline.
pub mod application;

/// Infrastructure layer - Adapters and process plumbing.
pub mod infrastructure;

/// Command-line interface.
pub mod cli;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::cusip::{CusipError, check_digit, random_cusip};
pub use domain::trade::{ISSUERS, ReportingCapacity, Side, TradeOverrides, TradeRecord};

// Generation pipeline
pub use application::emitter::{EmitError, EmitterConfig, TradeEmitter};
pub use application::pairing::PairPolicy;
pub use application::ports::{RecordSink, SinkError};
pub use application::queue::FeedQueue;
pub use application::scheduler::{Cycle, EmitSchedule};

// Infrastructure config
pub use infrastructure::config::{
    ConfigError, FeedSettings, GeneratorConfig, OutputSettings, TcpSettings,
};

// Record sinks
pub use infrastructure::sink::{FileSink, MemorySink, StdoutSink};

// TCP feed server (for integration tests)
pub use infrastructure::tcp::{FeedServerConfig, FeedServerError, TcpFeedServer};
