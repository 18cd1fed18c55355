//! Critical-section occupancy gauge.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts processes inside the critical section and remembers the peak.
///
/// The token already guarantees exclusion structurally; this only observes it.
#[derive(Debug, Default)]
pub(crate) struct Occupancy {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl Occupancy {
    pub(crate) fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak.fetch_max(now, Ordering::AcqRel);
    }

    pub(crate) fn exit(&self) {
        self.current.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn peak(&self) -> usize {
        self.peak.load(Ordering::Acquire)
    }
}
