//! Volume-weighted execution price estimation.

use model::Side;
use rust_decimal::Decimal;

use crate::error::OrderBookError;
use crate::store::PriceLevelStore;

/// Outcome of walking a book to fill a target volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillEstimate {
    /// The full volume was available.
    Filled {
        /// Total cost divided by the requested volume.
        average_price: Decimal,
        volume: Decimal,
    },
    /// The book ran out before the requested volume was filled.
    Partial {
        filled: Decimal,
        /// Accumulated cost of the filled part.
        cost: Decimal,
        requested: Decimal,
    },
}

impl FillEstimate {
    /// Reported price for this estimate.
    ///
    /// For a thin book this is the raw accumulated cost, not a per-unit price.
    /// Downstream slippage figures have always been computed from this value,
    /// so it is kept as is; check [`is_partial`](Self::is_partial) or use
    /// [`filled_average`](Self::filled_average) for a per-unit figure.
    pub fn price(&self) -> Decimal {
        match self {
            FillEstimate::Filled { average_price, .. } => *average_price,
            FillEstimate::Partial { cost, .. } => *cost,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, FillEstimate::Partial { .. })
    }

    /// Average price over the volume actually filled, `None` if nothing filled.
    pub fn filled_average(&self) -> Option<Decimal> {
        match self {
            FillEstimate::Filled { average_price, .. } => Some(*average_price),
            FillEstimate::Partial { filled, cost, .. } => cost.checked_div(*filled),
        }
    }

    pub fn filled_volume(&self) -> Decimal {
        match self {
            FillEstimate::Filled { volume, .. } => *volume,
            FillEstimate::Partial { filled, .. } => *filled,
        }
    }
}

/// Walks `store` from the best price outward for `side` and prices `volume` units.
pub fn estimate_fill<S>(store: &S, side: Side, volume: Decimal) -> Result<FillEstimate, OrderBookError>
where
    S: PriceLevelStore + ?Sized,
{
    if volume <= Decimal::ZERO {
        return Err(OrderBookError::InvalidVolume(volume));
    }

    let mut remaining = volume;
    let mut cost = Decimal::ZERO;

    let overflow = || OrderBookError::Overflow(volume);

    for level in store.ordered_entries(side) {
        let take = remaining.min(level.size);
        cost = level
            .price
            .value()
            .checked_mul(take)
            .and_then(|level_cost| cost.checked_add(level_cost))
            .ok_or_else(overflow)?;
        // take <= remaining, so this cannot overflow
        remaining -= take;

        if remaining <= Decimal::ZERO {
            return Ok(FillEstimate::Filled {
                average_price: cost.checked_div(volume).ok_or_else(overflow)?,
                volume,
            });
        }
    }

    Ok(FillEstimate::Partial {
        filled: volume - remaining,
        cost,
        requested: volume,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price::Price;
    use crate::store::BTreeLevelStore;
    use rust_decimal_macros::dec;

    fn store(levels: &[(&str, Decimal)]) -> BTreeLevelStore {
        let mut store = BTreeLevelStore::new();
        for (price, size) in levels {
            store.set(price.parse::<Price>().unwrap(), *size);
        }
        store
    }

    #[test]
    fn test_fill_across_levels() {
        let book = store(&[("100.00", dec!(5)), ("101.00", dec!(10))]);
        let estimate = estimate_fill(&book, Side::Sell, dec!(12)).unwrap();

        // 5 @ 100 + 7 @ 101 = 1207
        assert!(!estimate.is_partial());
        assert_eq!((estimate.price() * dec!(12)).round_dp(8), dec!(1207));
        assert_eq!(estimate.price().round_dp(4), dec!(100.5833));
    }

    #[test]
    fn test_fill_within_best_level() {
        let book = store(&[("100.00", dec!(50)), ("101.00", dec!(10))]);
        let estimate = estimate_fill(&book, Side::Sell, dec!(10)).unwrap();
        assert_eq!(estimate.price(), dec!(100));
    }

    #[test]
    fn test_exact_fill_is_not_partial() {
        let book = store(&[("100.00", dec!(4)), ("102.00", dec!(6))]);
        let estimate = estimate_fill(&book, Side::Sell, dec!(10)).unwrap();

        assert!(!estimate.is_partial());
        assert_eq!(estimate.price(), dec!(101.2));
    }

    #[test]
    fn test_buy_side_walks_highest_first() {
        let book = store(&[("99.00", dec!(10)), ("100.00", dec!(5))]);
        let estimate = estimate_fill(&book, Side::Buy, dec!(10)).unwrap();

        // 5 @ 100 + 5 @ 99 = 995
        assert_eq!(estimate.price(), dec!(99.5));
    }

    #[test]
    fn test_thin_book_returns_raw_cost() {
        let book = store(&[("100.00", dec!(3))]);
        let estimate = estimate_fill(&book, Side::Sell, dec!(10)).unwrap();

        assert!(estimate.is_partial());
        assert_eq!(estimate.price(), dec!(300));
        assert_eq!(estimate.filled_volume(), dec!(3));
        assert_eq!(estimate.filled_average(), Some(dec!(100)));
    }

    #[test]
    fn test_empty_book() {
        let book = BTreeLevelStore::new();
        let estimate = estimate_fill(&book, Side::Buy, dec!(10)).unwrap();

        assert!(estimate.is_partial());
        assert_eq!(estimate.price(), Decimal::ZERO);
        assert_eq!(estimate.filled_average(), None);
    }

    #[test]
    fn test_rejects_non_positive_volume() {
        let book = store(&[("100.00", dec!(3))]);
        assert_eq!(
            estimate_fill(&book, Side::Sell, Decimal::ZERO),
            Err(OrderBookError::InvalidVolume(Decimal::ZERO))
        );
        assert!(estimate_fill(&book, Side::Sell, dec!(-1)).is_err());
    }

    #[test]
    fn test_overflowing_cost_is_an_error() {
        let book = store(&[("100.00", dec!(1)), ("70000000000000000000000000000", dec!(5))]);

        assert_eq!(
            estimate_fill(&book, Side::Sell, dec!(10)),
            Err(OrderBookError::Overflow(dec!(10)))
        );
        // Volume that stops before the huge level still prices
        assert_eq!(estimate_fill(&book, Side::Sell, dec!(1)).unwrap().price(), dec!(100));
    }

    #[test]
    fn test_does_not_mutate_store() {
        let book = store(&[("100.00", dec!(5)), ("101.00", dec!(10))]);
        let before = book.clone();
        let _ = estimate_fill(&book, Side::Sell, dec!(12)).unwrap();
        assert_eq!(book, before);
    }
}
