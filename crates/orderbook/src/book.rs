//! One side of a local order book, built from snapshots and raw deltas.

use model::{ChangeRecord, RawLevel, Side};
use rust_decimal::Decimal;
use tracing::warn;

use crate::error::OrderBookError;
use crate::level::{parse_level, PriceLevel};
use crate::pricing::{estimate_fill, FillEstimate};
use crate::store::{BTreeLevelStore, PriceLevelStore};

/// Counts from applying a snapshot or a batch of changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    /// Levels inserted or overwritten.
    pub applied: usize,
    /// Levels removed by a zero-size change.
    pub deleted: usize,
    /// Malformed or misrouted entries that were skipped.
    pub rejected: usize,
}

impl ApplyStats {
    pub fn total(&self) -> usize {
        self.applied + self.deleted + self.rejected
    }
}

/// Price levels for a single side of one instrument.
///
/// Feed values arrive as raw strings and are parsed here, entry by entry.
/// A malformed entry is logged and skipped without aborting its batch.
#[derive(Debug, Clone)]
pub struct BookSide<S = BTreeLevelStore> {
    side: Side,
    store: S,
    /// Whether a snapshot has been applied.
    initialized: bool,
}

impl BookSide<BTreeLevelStore> {
    /// Creates an empty, uninitialized side backed by a `BTreeMap`.
    pub fn new(side: Side) -> Self {
        Self::with_store(side, BTreeLevelStore::new())
    }
}

impl<S: PriceLevelStore> BookSide<S> {
    pub fn with_store(side: Side, store: S) -> Self {
        Self {
            side,
            store,
            initialized: false,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Levels from the best price outward.
    pub fn levels(&self) -> impl Iterator<Item = PriceLevel> + '_ {
        self.store.ordered_entries(self.side)
    }

    pub fn best(&self) -> Option<PriceLevel> {
        self.levels().next()
    }

    pub fn top(&self, n: usize) -> Vec<PriceLevel> {
        self.levels().take(n).collect()
    }

    /// Total size resting on this side.
    pub fn depth(&self) -> Decimal {
        self.levels().map(|level| level.size).sum()
    }

    /// Point-in-time copy that later changes to `self` do not affect.
    pub fn snapshot_copy(&self) -> Self {
        Self {
            side: self.side,
            store: self.store.snapshot_copy(),
            initialized: self.initialized,
        }
    }

    /// Replaces the side's contents with a full snapshot.
    ///
    /// Zero-size entries are ignored; for duplicate normalized prices the last
    /// entry wins.
    pub fn apply_snapshot(&mut self, levels: &[RawLevel]) -> ApplyStats {
        let mut stats = ApplyStats::default();
        self.store.clear();

        for (price, size) in levels {
            match parse_level(price, size) {
                Ok(level) if level.size.is_zero() => {}
                Ok(level) => {
                    self.store.set(level.price, level.size);
                    stats.applied += 1;
                }
                Err(e) => {
                    warn!(side = %self.side, price = %price, size = %size, error = %e, "skipping snapshot level");
                    stats.rejected += 1;
                }
            }
        }

        self.initialized = true;
        stats
    }

    /// Applies absolute level changes in arrival order.
    ///
    /// A zero size removes the level if present; anything else overwrites it.
    pub fn apply_changes<'a, I>(&mut self, changes: I) -> ApplyStats
    where
        I: IntoIterator<Item = &'a ChangeRecord>,
    {
        let mut stats = ApplyStats::default();

        for change in changes {
            match self.apply_change(change) {
                Ok(Some(_)) => stats.applied += 1,
                Ok(None) => stats.deleted += 1,
                Err(e) => {
                    warn!(
                        side = %self.side,
                        price = %change.price,
                        size = %change.size,
                        error = %e,
                        "skipping level change"
                    );
                    stats.rejected += 1;
                }
            }
        }

        stats
    }

    /// Returns the new level, or `None` if the change removed one.
    ///
    /// Removing a level that is not present still counts as a removal.
    fn apply_change(&mut self, change: &ChangeRecord) -> Result<Option<PriceLevel>, OrderBookError> {
        if change.side != self.side {
            return Err(OrderBookError::SideMismatch {
                expected: self.side,
                found: change.side,
            });
        }

        let level = parse_level(&change.price, &change.size)?;
        if level.size.is_zero() {
            if self.store.has(level.price) {
                self.store.delete(level.price);
            }
            Ok(None)
        } else {
            self.store.set(level.price, level.size);
            Ok(Some(level))
        }
    }

    /// Prices `volume` units against this side.
    pub fn estimate_fill(&self, volume: Decimal) -> Result<FillEstimate, OrderBookError> {
        estimate_fill(&self.store, self.side, volume)
    }

    /// Drops all levels and marks the side as waiting for a snapshot.
    pub fn clear(&mut self) {
        self.store.clear();
        self.initialized = false;
    }
}
