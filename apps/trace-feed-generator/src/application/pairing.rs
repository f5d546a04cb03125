//! Paired opposite-side record generation.
//!
//! Dealer-to-dealer trades show up in TRACE as two reports of the same
//! execution: one buy and one sell, sharing the CUSIP, control ID, and
//! execution timestamp, filed by different dealers. [`PairPolicy`] decides
//! per primary record whether to produce that second leg.

use rand::Rng;

use crate::domain::trade::{TradeOverrides, TradeRecord};

/// Probability-gated generator of opposite-side pair legs.
#[derive(Debug, Clone, Copy)]
pub struct PairPolicy {
    probability: f64,
}

impl PairPolicy {
    /// Creates a policy pairing with the given probability, clamped to
    /// `[0.0, 1.0]`.
    #[must_use]
    pub fn new(probability: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
        }
    }

    /// The effective pair probability.
    #[must_use]
    pub const fn probability(&self) -> f64 {
        self.probability
    }

    /// Rolls the pair probability and, on success, builds the second leg.
    ///
    /// The second leg shares `first`'s CUSIP, control ID, and execution
    /// timestamp, inverts the side, and draws a fresh dealer. Price,
    /// volume, report delay, capacity, coupon, and maturity are
    /// independently randomized, so the late-report modifier reflects the
    /// second leg's own delay.
    pub fn maybe_pair(&self, first: &TradeRecord, rng: &mut impl Rng) -> Option<TradeRecord> {
        if !rng.random_bool(self.probability) {
            return None;
        }
        let overrides = TradeOverrides {
            cusip: Some(first.cusip.clone()),
            exec_time: Some(first.exec_time),
            control_id: Some(first.control_id.clone()),
            side: Some(first.side.opposite()),
            dealer_id: None,
        };
        Some(TradeRecord::generate(overrides, rng))
    }
}
