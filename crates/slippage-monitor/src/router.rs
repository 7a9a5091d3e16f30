//! Routes feed events to the side books.

use std::sync::Arc;

use metrics::SharedMetrics;
use model::{BookSnapshot, BookUpdate, FeedEvent, Side};
use tracing::{debug, info, warn};

use crate::side_book::SideBook;

/// Hands snapshots and changes for one product to its two side books.
///
/// Routing never parses prices or sizes; changes are queued as they arrived
/// and only parsed when a tick applies them.
pub struct FeedRouter {
    product_id: String,
    buy: Arc<SideBook>,
    sell: Arc<SideBook>,
    metrics: SharedMetrics,
}

impl FeedRouter {
    pub fn new(
        product_id: impl Into<String>,
        buy: Arc<SideBook>,
        sell: Arc<SideBook>,
        metrics: SharedMetrics,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            buy,
            sell,
            metrics,
        }
    }

    pub fn book(&self, side: Side) -> &Arc<SideBook> {
        match side {
            Side::Buy => &self.buy,
            Side::Sell => &self.sell,
        }
    }

    pub fn route(&self, event: FeedEvent) {
        match event {
            FeedEvent::Snapshot(snapshot) => self.on_snapshot(snapshot),
            FeedEvent::Update(update) => self.on_update(update),
        }
    }

    fn on_snapshot(&self, snapshot: BookSnapshot) {
        if snapshot.product_id != self.product_id {
            debug!(product_id = %snapshot.product_id, "ignoring snapshot for other product");
            return;
        }

        for side in [Side::Buy, Side::Sell] {
            let outcome = self.book(side).apply_snapshot(snapshot.levels(side));
            self.metrics
                .add_entries_rejected(outcome.stats.rejected as u64);

            if outcome.stats.rejected > 0 {
                warn!(side = %side, rejected = outcome.stats.rejected, "snapshot had malformed levels");
            }
            info!(
                product_id = %self.product_id,
                side = %side,
                levels = outcome.stats.applied,
                discarded = outcome.discarded,
                "book initialized from snapshot"
            );
        }
    }

    fn on_update(&self, update: BookUpdate) {
        if update.product_id != self.product_id {
            debug!(product_id = %update.product_id, "ignoring update for other product");
            return;
        }

        let count = update.changes.len() as u64;
        for change in update.changes {
            self.book(change.side).enqueue(change);
        }
        self.metrics.add_changes_buffered(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics::create_metrics;
    use model::ChangeRecord;

    fn router() -> FeedRouter {
        FeedRouter::new(
            "BTC-USD",
            Arc::new(SideBook::new(Side::Buy)),
            Arc::new(SideBook::new(Side::Sell)),
            create_metrics(),
        )
    }

    fn snapshot(product_id: &str) -> FeedEvent {
        FeedEvent::Snapshot(BookSnapshot {
            product_id: product_id.to_string(),
            bids: vec![
                ("99.00".to_string(), "2".to_string()),
                ("bad".to_string(), "1".to_string()),
            ],
            asks: vec![("100.00".to_string(), "5".to_string())],
        })
    }

    #[test]
    fn test_snapshot_initializes_both_sides() {
        let router = router();
        router.route(snapshot("BTC-USD"));

        assert!(router.book(Side::Buy).with_book(|b| b.is_initialized() && b.len() == 1));
        assert!(router.book(Side::Sell).with_book(|b| b.is_initialized() && b.len() == 1));
        assert_eq!(router.metrics.entries_rejected(), 1);
    }

    #[test]
    fn test_other_product_is_ignored() {
        let router = router();
        router.route(snapshot("ETH-USD"));
        router.route(FeedEvent::Update(BookUpdate {
            product_id: "ETH-USD".to_string(),
            time: None,
            changes: vec![ChangeRecord::new(Side::Buy, "99.00", "1")],
        }));

        assert!(!router.book(Side::Buy).with_book(|b| b.is_initialized()));
        assert_eq!(router.book(Side::Buy).pending(), 0);
    }

    #[test]
    fn test_update_splits_changes_by_side() {
        let router = router();
        router.route(FeedEvent::Update(BookUpdate {
            product_id: "BTC-USD".to_string(),
            time: Some("2024-01-01T00:00:00.000000Z".to_string()),
            changes: vec![
                ChangeRecord::new(Side::Buy, "99.00", "1"),
                ChangeRecord::new(Side::Sell, "101.00", "0"),
                ChangeRecord::new(Side::Sell, "102.00", "3"),
            ],
        }));

        assert_eq!(router.book(Side::Buy).pending(), 1);
        assert_eq!(router.book(Side::Sell).pending(), 2);
        assert_eq!(router.metrics.changes_buffered(), 3);
    }

    #[test]
    fn test_snapshot_discards_pending_changes() {
        let router = router();
        router.route(FeedEvent::Update(BookUpdate {
            product_id: "BTC-USD".to_string(),
            time: None,
            changes: vec![ChangeRecord::new(Side::Sell, "100.00", "0")],
        }));
        router.route(snapshot("BTC-USD"));

        assert_eq!(router.book(Side::Sell).pending(), 0);
        assert!(router.book(Side::Sell).with_book(|b| b.len() == 1));
    }
}
