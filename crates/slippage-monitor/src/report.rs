//! Per-tick slippage report.

use std::fmt;

use chrono::{DateTime, Utc};
use model::Side;
use orderbook::{ApplyStats, FillEstimate};
use rust_decimal::{Decimal, RoundingStrategy};

/// Fractional digits used when no precision is given to the formatter.
pub const DEFAULT_REPORT_PRECISION: usize = 4;

/// Result of one measurement cycle for one side.
#[derive(Debug, Clone, PartialEq)]
pub struct SlippageReport {
    pub timestamp: DateTime<Utc>,
    pub side: Side,
    /// Priced against the book as it stood before this tick's changes.
    pub expected: FillEstimate,
    /// Priced against the book after applying them.
    pub executed: FillEstimate,
    /// `(executed - expected) * 100 / expected`.
    pub slippage_pct: Decimal,
    pub changes: ApplyStats,
}

impl SlippageReport {
    pub fn expected_price(&self) -> Decimal {
        self.expected.price()
    }

    pub fn executed_price(&self) -> Decimal {
        self.executed.price()
    }

    /// Either estimate ran out of book.
    pub fn is_partial(&self) -> bool {
        self.expected.is_partial() || self.executed.is_partial()
    }

    pub fn rounded_slippage(&self, precision: u32) -> Decimal {
        self.slippage_pct
            .round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// `"<side> slippage -> <pct> %"`; the formatter precision sets the digits,
/// so `format!("{report:.2}")` prints two.
impl fmt::Display for SlippageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(DEFAULT_REPORT_PRECISION);
        let pct = self.rounded_slippage(precision as u32);
        write!(f, "{} slippage -> {:.*} %", self.side, precision, pct)?;
        if self.is_partial() {
            write!(f, " (partial fill)")?;
        }
        Ok(())
    }
}
