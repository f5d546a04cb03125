//! Infrastructure Layer - Adapters binding the feed to the outside world.
//!
//! Configuration structures, the stdout/file sink adapters, the TCP
//! delivery server, and telemetry initialization.

/// Runtime configuration structures and validation.
pub mod config;

/// Record sink adapters: stdout, file, and the in-memory test double.
pub mod sink;

/// Single-client TCP feed server.
pub mod tcp;

/// Console tracing initialization.
pub mod telemetry;
