//! Price level representation.

use rust_decimal::Decimal;

use crate::error::OrderBookError;
use crate::price::{parse_decimal, Price};

/// A single price level in the order book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLevel {
    /// Normalized price of this level.
    pub price: Price,
    /// Total outstanding size at this price.
    pub size: Decimal,
}

impl PriceLevel {
    pub fn new(price: Price, size: Decimal) -> Self {
        Self { price, size }
    }

    /// Returns the notional value (price * size) at this level.
    pub fn notional(&self) -> Decimal {
        self.price.value() * self.size
    }
}

/// Parses a size string. Zero is valid (it means "remove"), negatives are not.
pub fn parse_size(raw: &str) -> Result<Decimal, OrderBookError> {
    match parse_decimal(raw) {
        Some(size) if size >= Decimal::ZERO => Ok(size),
        _ => Err(OrderBookError::InvalidSize(raw.to_string())),
    }
}

/// Parses a raw `(price, size)` pair from the feed.
pub fn parse_level(price: &str, size: &str) -> Result<PriceLevel, OrderBookError> {
    let price = price.parse::<Price>()?;
    let size = parse_size(size)?;
    Ok(PriceLevel::new(price, size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_level() {
        let level = parse_level("101.005", "0.25").unwrap();
        assert_eq!(level.price.value(), dec!(101.01));
        assert_eq!(level.size, dec!(0.25));
    }

    #[test]
    fn test_parse_size_zero_and_negative() {
        assert_eq!(parse_size("0").unwrap(), Decimal::ZERO);
        assert_eq!(parse_size("0.00000000").unwrap(), Decimal::ZERO);
        assert!(matches!(
            parse_size("-1"),
            Err(OrderBookError::InvalidSize(_))
        ));
        assert!(parse_size("NaN").is_err());
    }

    #[test]
    fn test_notional() {
        let level = parse_level("100.00", "5").unwrap();
        assert_eq!(level.notional(), dec!(500));
    }
}
