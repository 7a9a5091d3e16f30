//! Ordered price level storage.

use std::collections::BTreeMap;

use model::Side;
use rust_decimal::Decimal;

use crate::level::PriceLevel;
use crate::price::Price;

/// Ordered mapping of normalized price to outstanding size for one side.
///
/// Implementations must never hold a zero-size level and must iterate in
/// matching order: ascending for asks, descending for bids.
pub trait PriceLevelStore: Send + Sync {
    /// Inserts or overwrites the level at `price`.
    ///
    /// Callers pass a positive size; a zero size is treated as [`delete`].
    ///
    /// [`delete`]: PriceLevelStore::delete
    fn set(&mut self, price: Price, size: Decimal);

    /// Removes the level at `price`, returning its size if it was present.
    fn delete(&mut self, price: Price) -> Option<Decimal>;

    fn get(&self, price: Price) -> Option<Decimal>;

    fn has(&self, price: Price) -> bool {
        self.get(price).is_some()
    }

    /// Levels from the best price outward for `side`.
    ///
    /// The iterator borrows the store and can be re-created at any time.
    fn ordered_entries(&self, side: Side) -> Box<dyn Iterator<Item = PriceLevel> + '_>;

    /// Independent copy; mutating either side afterwards does not affect the other.
    fn snapshot_copy(&self) -> Self
    where
        Self: Sized;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);
}

/// `BTreeMap`-backed store. Bids iterate the map in reverse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BTreeLevelStore {
    levels: BTreeMap<Price, Decimal>,
}

impl BTreeLevelStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PriceLevelStore for BTreeLevelStore {
    fn set(&mut self, price: Price, size: Decimal) {
        debug_assert!(size >= Decimal::ZERO, "negative size at {price}");
        if size.is_zero() {
            self.levels.remove(&price);
        } else {
            self.levels.insert(price, size);
        }
    }

    fn delete(&mut self, price: Price) -> Option<Decimal> {
        self.levels.remove(&price)
    }

    fn get(&self, price: Price) -> Option<Decimal> {
        self.levels.get(&price).copied()
    }

    fn has(&self, price: Price) -> bool {
        self.levels.contains_key(&price)
    }

    fn ordered_entries(&self, side: Side) -> Box<dyn Iterator<Item = PriceLevel> + '_> {
        let to_level = |(price, size): (&Price, &Decimal)| PriceLevel::new(*price, *size);
        match side {
            Side::Sell => Box::new(self.levels.iter().map(to_level)),
            Side::Buy => Box::new(self.levels.iter().rev().map(to_level)),
        }
    }

    fn snapshot_copy(&self) -> Self {
        self.clone()
    }

    fn len(&self) -> usize {
        self.levels.len()
    }

    fn clear(&mut self) {
        self.levels.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn px(s: &str) -> Price {
        s.parse().unwrap()
    }

    fn sample_store() -> BTreeLevelStore {
        let mut store = BTreeLevelStore::new();
        store.set(px("101.00"), dec!(2));
        store.set(px("100.50"), dec!(1));
        store.set(px("102.00"), dec!(3));
        store
    }

    fn prices(store: &BTreeLevelStore, side: Side) -> Vec<Decimal> {
        store
            .ordered_entries(side)
            .map(|level| level.price.value())
            .collect()
    }

    #[test]
    fn test_set_then_get() {
        let mut store = BTreeLevelStore::new();
        store.set(px("100.00"), dec!(1.5));

        assert_eq!(store.get(px("100.00")), Some(dec!(1.5)));
        assert!(store.has(px("100.00")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_set_overwrites() {
        let mut store = BTreeLevelStore::new();
        store.set(px("100.00"), dec!(1.5));
        store.set(px("100.001"), dec!(4));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(px("100.00")), Some(dec!(4)));
    }

    #[test]
    fn test_set_zero_removes() {
        let mut store = sample_store();
        store.set(px("101.00"), Decimal::ZERO);

        assert!(!store.has(px("101.00")));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_delete() {
        let mut store = sample_store();

        assert_eq!(store.delete(px("101.00")), Some(dec!(2)));
        assert!(!store.has(px("101.00")));
        assert!(prices(&store, Side::Sell)
            .iter()
            .all(|p| *p != dec!(101.00)));

        // Absent key is a no-op
        assert_eq!(store.delete(px("99.00")), None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_sell_order_ascending() {
        let store = sample_store();
        assert_eq!(
            prices(&store, Side::Sell),
            vec![dec!(100.50), dec!(101.00), dec!(102.00)]
        );
    }

    #[test]
    fn test_buy_order_descending() {
        let store = sample_store();
        assert_eq!(
            prices(&store, Side::Buy),
            vec![dec!(102.00), dec!(101.00), dec!(100.50)]
        );
    }

    #[test]
    fn test_ordered_entries_restartable() {
        let store = sample_store();
        let first: Vec<_> = store.ordered_entries(Side::Sell).take(1).collect();
        let again: Vec<_> = store.ordered_entries(Side::Sell).collect();

        assert_eq!(first[0], again[0]);
        assert_eq!(again.len(), 3);
    }

    #[test]
    fn test_snapshot_copy_is_independent() {
        let mut store = sample_store();
        let copy = store.snapshot_copy();

        store.delete(px("100.50"));
        store.set(px("103.00"), dec!(7));

        assert!(copy.has(px("100.50")));
        assert!(!copy.has(px("103.00")));
        assert_eq!(copy.len(), 3);
    }

    #[test]
    fn test_clear() {
        let mut store = sample_store();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.ordered_entries(Side::Buy).count(), 0);
    }
}
