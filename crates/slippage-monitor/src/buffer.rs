//! Per-side queue of level changes awaiting the next tick.

use model::ChangeRecord;
use parking_lot::Mutex;

/// Append-only queue drained once per tick.
///
/// The feed path appends; the tick driver takes everything in one lock
/// acquisition, so a record lands in exactly one drain and appends racing a
/// drain wait for the next one.
#[derive(Debug, Default)]
pub struct UpdateBuffer {
    pending: Mutex<Vec<ChangeRecord>>,
}

impl UpdateBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, record: ChangeRecord) {
        self.pending.lock().push(record);
    }

    pub fn extend<I>(&self, records: I)
    where
        I: IntoIterator<Item = ChangeRecord>,
    {
        self.pending.lock().extend(records);
    }

    /// Takes all queued records in arrival order and leaves the buffer empty.
    pub fn drain(&self) -> Vec<ChangeRecord> {
        std::mem::take(&mut *self.pending.lock())
    }

    /// Discards queued records, returning how many were dropped.
    pub fn clear(&self) -> usize {
        self.drain().len()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}
