//! Synthetic TRACE-style trade report records.
//!
//! A [`TradeRecord`] carries the fields a bond trade report would: a
//! check-digited CUSIP, execution and report timestamps, price, volume,
//! side, dealer identity, reporting capacity, the late-report modifier,
//! coupon, and maturity. Field declaration order is wire order; records
//! serialize to the JSON consumers of the feed expect.
//!
//! Generation is randomized but plausible: timestamps sit in the recent
//! past, prices near par, coupons and maturities in investment-grade
//! ranges. [`TradeOverrides`] pins selected fields (for paired legs and
//! tests) while everything else stays random.

use chrono::{DateTime, Days, NaiveDate, TimeDelta, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::cusip::random_cusip;

/// Issuers named on generated records.
pub const ISSUERS: &[&str] = &[
    "US Treasury",
    "IBM",
    "Apple",
    "Microsoft",
    "Johnson & Johnson",
    "Fannie Mae",
    "Goldman Sachs",
    "Citi",
    "Amazon",
    "Pfizer",
];

/// Reports delayed beyond this window carry the late-report modifier.
pub const ON_TIME_WINDOW_SECS: i64 = 900;

/// TRACE modifier for a report filed outside the on-time window.
pub const LATE_REPORT_MODIFIER: &str = "Z";

/// Characters eligible for control IDs.
const CONTROL_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a control ID.
const CONTROL_ID_LEN: usize = 10;

/// Maximum age of a generated execution timestamp, relative to now.
const MAX_EXECUTION_AGE_SECS: i64 = 600;

/// Maximum delay between execution and report timestamps.
const MAX_REPORT_DELAY_SECS: i64 = 1800;

// ============================================================================
// Enums
// ============================================================================

/// Trade side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    /// Buy report.
    Buy,
    /// Sell report.
    Sell,
}

impl Side {
    /// Returns the opposite side.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Capacity in which the dealer reported the trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportingCapacity {
    /// Dealer traded for its own account.
    #[serde(rename = "P")]
    Principal,
    /// Dealer acted as agent for a customer.
    #[serde(rename = "A")]
    Agent,
}

impl ReportingCapacity {
    /// Wire representation (`P` or `A`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Principal => "P",
            Self::Agent => "A",
        }
    }
}

impl fmt::Display for ReportingCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Trade record
// ============================================================================

/// One synthetic trade report. Field order is wire order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Report control ID, 10 characters from `A-Z0-9`.
    pub control_id: String,
    /// 9-character CUSIP with a valid check digit.
    pub cusip: String,
    /// Issuer display name.
    pub issuer: String,
    /// When the trade executed.
    pub exec_time: DateTime<Utc>,
    /// When the trade was reported; never precedes `exec_time`.
    pub report_time: DateTime<Utc>,
    /// Clean price near par, three decimal places.
    pub price: Decimal,
    /// Face value traded, in dollars.
    pub volume: u32,
    /// Buy or sell.
    pub side: Side,
    /// Reporting dealer identifier.
    pub dealer_id: u16,
    /// Principal or agent.
    pub reporting_capacity: ReportingCapacity,
    /// `"Z"` when the report is late, empty otherwise.
    pub modifier3: String,
    /// Annual coupon percentage, two decimal places.
    pub coupon: Decimal,
    /// Maturity date, at least a year past the execution date.
    pub maturity: NaiveDate,
}

/// Optional field pins for [`TradeRecord::generate`].
///
/// Present fields are applied verbatim; absent fields are randomized.
/// Derived fields (`report_time`, `modifier3`) are always recomputed from
/// the effective execution time.
#[derive(Debug, Clone, Default)]
pub struct TradeOverrides {
    /// Pin the CUSIP (paired legs share one).
    pub cusip: Option<String>,
    /// Pin the execution timestamp.
    pub exec_time: Option<DateTime<Utc>>,
    /// Pin the control ID.
    pub control_id: Option<String>,
    /// Pin the side.
    pub side: Option<Side>,
    /// Pin the reporting dealer.
    pub dealer_id: Option<u16>,
}

impl TradeRecord {
    /// Generates one record, honoring `overrides` and randomizing the rest.
    ///
    /// The execution timestamp defaults to the recent past (up to ten
    /// minutes ago); the report timestamp is always the execution timestamp
    /// plus a fresh 0-1800 second delay, and `modifier3` is recomputed from
    /// that delay even when `exec_time` is overridden.
    #[must_use]
    pub fn generate(overrides: TradeOverrides, rng: &mut impl Rng) -> Self {
        let exec_time = overrides.exec_time.unwrap_or_else(|| {
            Utc::now() - TimeDelta::seconds(rng.random_range(0..=MAX_EXECUTION_AGE_SECS))
        });
        let report_time = exec_time + TimeDelta::seconds(rng.random_range(0..=MAX_REPORT_DELAY_SECS));
        let modifier3 = if is_late_report(exec_time, report_time) {
            LATE_REPORT_MODIFIER.to_string()
        } else {
            String::new()
        };

        Self {
            control_id: overrides
                .control_id
                .unwrap_or_else(|| random_control_id(rng)),
            cusip: overrides.cusip.unwrap_or_else(|| random_cusip(rng)),
            issuer: ISSUERS[rng.random_range(0..ISSUERS.len())].to_string(),
            exec_time,
            report_time,
            price: Decimal::new(rng.random_range(90_000..=110_000), 3),
            volume: rng.random_range(100_000..=5_000_000),
            side: overrides.side.unwrap_or_else(|| {
                if rng.random_bool(0.5) {
                    Side::Buy
                } else {
                    Side::Sell
                }
            }),
            dealer_id: overrides
                .dealer_id
                .unwrap_or_else(|| rng.random_range(1000..=9999)),
            reporting_capacity: if rng.random_bool(0.5) {
                ReportingCapacity::Principal
            } else {
                ReportingCapacity::Agent
            },
            modifier3,
            coupon: Decimal::new(rng.random_range(100..=600), 2),
            maturity: exec_time.date_naive() + Days::new(rng.random_range(365..=3650)),
        }
    }

    /// True when the report was filed outside the on-time window.
    #[must_use]
    pub fn is_late(&self) -> bool {
        is_late_report(self.exec_time, self.report_time)
    }
}

fn is_late_report(exec_time: DateTime<Utc>, report_time: DateTime<Utc>) -> bool {
    report_time - exec_time > TimeDelta::seconds(ON_TIME_WINDOW_SECS)
}

fn random_control_id(rng: &mut impl Rng) -> String {
    (0..CONTROL_ID_LEN)
        .map(|_| CONTROL_ID_ALPHABET[rng.random_range(0..CONTROL_ID_ALPHABET.len())] as char)
        .collect()
}
