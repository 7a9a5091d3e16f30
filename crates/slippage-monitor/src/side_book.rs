//! One side's live book and pending-change buffer.

use chrono::Utc;
use model::{ChangeRecord, RawLevel, Side};
use orderbook::{slippage_pct, ApplyStats, BookSide, OrderBookError};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::debug;

use crate::buffer::UpdateBuffer;
use crate::report::SlippageReport;

/// Result of applying a snapshot through [`SideBook::apply_snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotOutcome {
    pub stats: ApplyStats,
    /// Buffered changes dropped because the snapshot supersedes them.
    pub discarded: usize,
}

/// The unit of mutual exclusion for one side: live levels plus their queue.
///
/// The feed path only calls [`enqueue`](Self::enqueue) and
/// [`apply_snapshot`](Self::apply_snapshot); the tick driver calls
/// [`tick`](Self::tick). Lock order is always book, then buffer.
#[derive(Debug)]
pub struct SideBook {
    side: Side,
    book: Mutex<BookSide>,
    buffer: UpdateBuffer,
}

impl SideBook {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            book: Mutex::new(BookSide::new(side)),
            buffer: UpdateBuffer::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn buffer(&self) -> &UpdateBuffer {
        &self.buffer
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Queues a change for the next tick. No parsing happens here.
    pub fn enqueue(&self, change: ChangeRecord) {
        self.buffer.push(change);
    }

    /// Replaces the live levels with a snapshot.
    ///
    /// Queued changes predate the snapshot and are discarded with it.
    pub fn apply_snapshot(&self, levels: &[RawLevel]) -> SnapshotOutcome {
        let mut book = self.book.lock();
        let stats = book.apply_snapshot(levels);
        let discarded = self.buffer.clear();
        SnapshotOutcome { stats, discarded }
    }

    /// Runs one measurement cycle against `volume`.
    ///
    /// Copies the book, drains and applies the queue, then prices both
    /// states. Returns `Ok(None)` while no snapshot has arrived; anything
    /// drained in that state is dropped.
    pub fn tick(&self, volume: Decimal) -> Result<Option<SlippageReport>, OrderBookError> {
        // Checked before draining so a bad volume does not consume the queue.
        if volume <= Decimal::ZERO {
            return Err(OrderBookError::InvalidVolume(volume));
        }

        let (before, after, changes) = {
            let mut book = self.book.lock();
            let drained = self.buffer.drain();

            if !book.is_initialized() {
                if !drained.is_empty() {
                    debug!(side = %self.side, dropped = drained.len(), "no snapshot yet, dropping changes");
                }
                return Ok(None);
            }

            let before = book.snapshot_copy();
            let changes = book.apply_changes(&drained);
            let after = book.estimate_fill(volume)?;
            (before, after, changes)
        };

        let expected = before.estimate_fill(volume)?;

        Ok(Some(SlippageReport {
            timestamp: Utc::now(),
            side: self.side,
            expected,
            executed: after,
            slippage_pct: slippage_pct(expected.price(), after.price()),
            changes,
        }))
    }

    /// Runs `f` against the live book under its lock.
    pub fn with_book<R>(&self, f: impl FnOnce(&BookSide) -> R) -> R {
        f(&self.book.lock())
    }
}
