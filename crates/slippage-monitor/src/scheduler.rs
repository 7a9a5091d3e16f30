//! Fixed-period measurement driver, one instance per side.

use std::sync::Arc;
use std::time::Duration;

use metrics::SharedMetrics;
use rust_decimal::Decimal;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::report::SlippageReport;
use crate::side_book::SideBook;

/// Drives [`SideBook::tick`] on a fixed period and forwards the reports.
pub struct TickScheduler {
    book: Arc<SideBook>,
    period: Duration,
    trade_volume: Decimal,
    metrics: SharedMetrics,
}

impl TickScheduler {
    pub fn new(
        book: Arc<SideBook>,
        period: Duration,
        trade_volume: Decimal,
        metrics: SharedMetrics,
    ) -> Self {
        Self {
            book,
            period,
            trade_volume,
            metrics,
        }
    }

    /// One measurement cycle. `None` when there is nothing to report.
    pub fn run_once(&self) -> Option<SlippageReport> {
        let report = match self.book.tick(self.trade_volume) {
            Ok(Some(report)) => report,
            Ok(None) => return None,
            Err(e) => {
                error!(side = %self.book.side(), error = %e, "tick failed");
                return None;
            }
        };

        self.metrics.inc_ticks_completed();
        self.metrics
            .add_entries_rejected(report.changes.rejected as u64);
        if report.is_partial() {
            self.metrics.inc_partial_fills();
        }

        debug!(
            side = %report.side,
            expected = %report.expected_price(),
            executed = %report.executed_price(),
            slippage_pct = %report.slippage_pct,
            applied = report.changes.applied,
            deleted = report.changes.deleted,
            rejected = report.changes.rejected,
            partial = report.is_partial(),
            "tick complete"
        );

        Some(report)
    }

    /// Ticks every period until shutdown or until the report receiver is dropped.
    ///
    /// The first tick fires one full period after start. Changes still queued
    /// at shutdown are not applied.
    pub async fn run(
        self,
        reports: mpsc::Sender<SlippageReport>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let side = self.book.side();
        let mut interval = interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            side = %side,
            period_ms = self.period.as_millis() as u64,
            volume = %self.trade_volume,
            "tick scheduler started"
        );

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }

                _ = interval.tick() => {
                    if let Some(report) = self.run_once() {
                        if reports.send(report).await.is_err() {
                            debug!(side = %side, "report receiver dropped");
                            break;
                        }
                    }
                }
            }
        }

        info!(side = %side, pending = self.book.pending(), "tick scheduler stopped");
    }
}
