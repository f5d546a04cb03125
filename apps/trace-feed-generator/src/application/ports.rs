//! Port Interfaces
//!
//! Contracts between the feed loop and the delivery adapters, following
//! the Hexagonal Architecture pattern. The loop serializes each record to
//! one JSON line and hands the line to every configured sink; sinks own
//! framing (the trailing newline) and durability.

use std::io;

use thiserror::Error;

/// Errors surfaced by record sinks.
///
/// Sink failures are fatal to the feed loop: stdout and file output must
/// stay durably ordered, so a failed append stops generation rather than
/// silently dropping records.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The underlying writer failed.
    #[error("sink write failed: {0}")]
    Io(#[from] io::Error),
}

/// Outbound port for newline-delimited record delivery.
///
/// Implementations append exactly one line per call, newline-terminated,
/// in call order.
pub trait RecordSink: Send {
    /// Appends one serialized record.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the write or flush fails.
    fn append(&mut self, line: &str) -> Result<(), SinkError>;
}
