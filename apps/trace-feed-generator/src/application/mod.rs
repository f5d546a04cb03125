//! Application Layer - The generation loop and its collaborators.
//!
//! Orchestrates the domain: pacing decisions, pair correlation, the
//! bounded delivery queue shared with the TCP server, and the sink port
//! the delivery adapters implement.

/// The generation loop: pacing, pairing, and record fan-out.
pub mod emitter;

/// Paired opposite-side record generation.
pub mod pairing;

/// Port interfaces implemented by delivery adapters.
pub mod ports;

/// Bounded delivery queue between the generation and delivery loops.
pub mod queue;

/// Emission pacing: steady intervals with jitter, periodic bursts.
pub mod scheduler;
