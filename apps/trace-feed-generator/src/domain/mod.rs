//! Domain Layer - Trade report types and identifier logic.
//!
//! This layer contains the pure generation logic for synthetic trade
//! reports: CUSIP checksum arithmetic and the randomized record builder.
//! No IO, no clocks beyond `Utc::now()`, no external services.

/// CUSIP generation and check-digit arithmetic.
pub mod cusip;

/// Trade report records, sides, capacities, and overrides.
pub mod trade;
