//! Property tests for book invariants under arbitrary snapshot/change sequences.

use model::{ChangeRecord, RawLevel, Side};
use orderbook::{BookSide, PriceLevelStore};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Prices in cents with occasional extra digits so normalization collides keys.
fn arb_price() -> impl Strategy<Value = String> {
    prop_oneof![
        (100u32..200u32, 0u32..100u32).prop_map(|(whole, cents)| format!("{whole}.{cents:02}")),
        (100u32..200u32, 0u32..1000u32).prop_map(|(whole, mills)| format!("{whole}.{mills:03}")),
    ]
}

/// Sizes with a heavy share of zeros, plus the odd malformed value.
fn arb_size() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => Just("0".to_string()),
        6 => (1u32..10_000u32).prop_map(|n| format!("{}.{:03}", n / 1000, n % 1000)),
        1 => Just("garbage".to_string()),
    ]
}

fn arb_level() -> impl Strategy<Value = RawLevel> {
    (arb_price(), arb_size())
}

fn arb_side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Buy), Just(Side::Sell)]
}

fn assert_no_zero_levels(book: &BookSide) -> Result<(), TestCaseError> {
    for level in book.levels() {
        prop_assert!(level.size > Decimal::ZERO, "zero-size level at {}", level.price);
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_no_zero_size_levels(
        side in arb_side(),
        snapshot in prop::collection::vec(arb_level(), 0..30),
        batches in prop::collection::vec(prop::collection::vec(arb_level(), 0..20), 0..5),
    ) {
        let mut book = BookSide::new(side);
        book.apply_snapshot(&snapshot);
        assert_no_zero_levels(&book)?;

        for batch in batches {
            let changes: Vec<ChangeRecord> = batch
                .into_iter()
                .map(|(price, size)| ChangeRecord::new(side, price, size))
                .collect();
            book.apply_changes(&changes);
            assert_no_zero_levels(&book)?;
        }
    }

    #[test]
    fn prop_levels_follow_matching_order(
        side in arb_side(),
        snapshot in prop::collection::vec(arb_level(), 0..40),
    ) {
        let mut book = BookSide::new(side);
        book.apply_snapshot(&snapshot);

        let prices: Vec<_> = book.levels().map(|level| level.price).collect();
        for pair in prices.windows(2) {
            match side {
                Side::Sell => prop_assert!(pair[0] < pair[1]),
                Side::Buy => prop_assert!(pair[0] > pair[1]),
            }
        }
    }

    #[test]
    fn prop_last_change_wins(
        side in arb_side(),
        price in arb_price(),
        sizes in prop::collection::vec(arb_size(), 1..10),
    ) {
        let mut book = BookSide::new(side);
        book.apply_snapshot(&[]);

        let changes: Vec<ChangeRecord> = sizes
            .iter()
            .map(|size| ChangeRecord::new(side, price.clone(), size.clone()))
            .collect();
        book.apply_changes(&changes);

        let key = price.parse().unwrap();
        let last_valid = sizes
            .iter()
            .rev()
            .find_map(|size| orderbook::parse_size(size).ok());

        match last_valid {
            Some(size) if !size.is_zero() => prop_assert_eq!(book.store().get(key), Some(size)),
            _ => prop_assert!(!book.store().has(key)),
        }
    }

    #[test]
    fn prop_full_fill_price_within_touched_levels(
        snapshot in prop::collection::vec(arb_level(), 1..30),
        volume in 1u32..50u32,
    ) {
        let mut book = BookSide::new(Side::Sell);
        book.apply_snapshot(&snapshot);

        let volume = Decimal::from(volume);
        let estimate = book.estimate_fill(volume).unwrap();
        if !estimate.is_partial() {
            let best = book.best().unwrap().price.value();
            let worst = book.levels().last().unwrap().price.value();
            prop_assert!(estimate.price() >= best);
            prop_assert!(estimate.price() <= worst);
        }
    }
}
