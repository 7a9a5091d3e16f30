//! Slippage between an expected and an executed price.

use rust_decimal::Decimal;

/// `(executed - expected) * 100 / expected`, in percent.
///
/// Returns zero when `expected` is zero or the arithmetic overflows.
pub fn slippage_pct(expected: Decimal, executed: Decimal) -> Decimal {
    if expected.is_zero() {
        return Decimal::ZERO;
    }

    executed
        .checked_sub(expected)
        .and_then(|diff| diff.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|scaled| scaled.checked_div(expected))
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_positive_slippage() {
        assert_eq!(slippage_pct(dec!(100.00), dec!(100.5833)), dec!(0.5833));
    }

    #[test]
    fn test_negative_slippage() {
        assert_eq!(slippage_pct(dec!(200), dec!(199)), dec!(-0.5));
    }

    #[test]
    fn test_unchanged_price() {
        assert_eq!(slippage_pct(dec!(101.25), dec!(101.25)), Decimal::ZERO);
    }

    #[test]
    fn test_zero_expected() {
        assert_eq!(slippage_pct(Decimal::ZERO, dec!(100)), Decimal::ZERO);
        assert_eq!(slippage_pct(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_overflow_falls_back_to_zero() {
        assert_eq!(slippage_pct(Decimal::MIN, Decimal::MAX), Decimal::ZERO);
    }
}
