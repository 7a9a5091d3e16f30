//! Normalized price keys.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::OrderBookError;

/// Number of fractional digits every price key is normalized to.
pub const PRICE_SCALE: u32 = 2;

/// A price rounded to [`PRICE_SCALE`] fractional digits.
///
/// Raw feed prices that round to the same value map to the same key, so
/// `"100.004"` and `"100.00"` address one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    /// Rounds `raw` half away from zero and fixes the scale at two digits.
    pub fn normalize(raw: Decimal) -> Self {
        let mut value =
            raw.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
        value.rescale(PRICE_SCALE);
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Price {
    type Err = OrderBookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = parse_decimal(s).ok_or_else(|| OrderBookError::InvalidPrice(s.to_string()))?;
        let price = Self::normalize(raw);
        if price.0 <= Decimal::ZERO {
            return Err(OrderBookError::InvalidPrice(s.to_string()));
        }
        Ok(price)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Parses plain or scientific decimal notation.
pub(crate) fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}
