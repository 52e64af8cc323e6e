//! Per-segment statistics.

#[cfg(feature = "metrics")]
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-segment operation statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentOps {
    /// Number of lookups that found their key.
    pub reads: u64,
    /// Number of stores (inserts, overwrites and in-place updates).
    pub writes: u64,
    /// Number of entries removed.
    pub removes: u64,
    /// Number of lock acquisitions (0 when metrics feature disabled).
    pub lock_acquisitions: u64,
    /// Cumulative lock wait time in nanoseconds (0 when lock-timing disabled).
    pub lock_wait_nanos: u64,
}

/// Operation counted per segment. The discriminant indexes the counter slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Counter {
    /// A lookup that found its key.
    Read = 0,
    /// A store, including in-place updates.
    Write = 1,
    /// Entries removed.
    Remove = 2,
    LockAcquisition = 3,
    /// Nanoseconds spent waiting for the lock.
    LockWait = 4,
}

#[cfg(feature = "metrics")]
const COUNTERS: usize = 5;

/// Relaxed atomic counters kept alongside each segment's lock.
///
/// Without the `metrics` feature the struct is empty and every `add` compiles
/// away, so segments pay nothing for bookkeeping they never report.
pub(crate) struct SegmentCounters {
    #[cfg(feature = "metrics")]
    slots: [AtomicU64; COUNTERS],
}

impl SegmentCounters {
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "metrics")]
            slots: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    #[inline]
    pub fn add(&self, counter: Counter, amount: u64) {
        #[cfg(feature = "metrics")]
        self.slots[counter as usize].fetch_add(amount, Ordering::Relaxed);
        #[cfg(not(feature = "metrics"))]
        let _ = (counter, amount);
    }

    #[cfg(feature = "metrics")]
    fn load(&self, counter: Counter) -> u64 {
        self.slots[counter as usize].load(Ordering::Relaxed)
    }

    #[cfg(not(feature = "metrics"))]
    fn load(&self, _counter: Counter) -> u64 {
        0
    }

    pub fn snapshot(&self) -> SegmentOps {
        SegmentOps {
            reads: self.load(Counter::Read),
            writes: self.load(Counter::Write),
            removes: self.load(Counter::Remove),
            lock_acquisitions: self.load(Counter::LockAcquisition),
            lock_wait_nanos: self.load(Counter::LockWait),
        }
    }
}

/// Aggregate statistics for a SegmentedMap instance.
///
/// Gathered one segment at a time, so under concurrent writes the figures
/// are not a single point-in-time view.
#[derive(Debug, Clone)]
pub struct Stats {
    /// Total number of entries across all segments.
    pub size: usize,
    /// Number of entries in each segment, by segment index.
    pub segment_sizes: Vec<usize>,
    /// Operation counts for each segment, by segment index.
    pub operations: Vec<SegmentOps>,
}

impl Stats {
    /// Largest segment size divided by the mean; 1.0 is perfectly balanced.
    /// Returns 0.0 for an empty map.
    pub fn max_load_ratio(&self) -> f64 {
        if self.size == 0 || self.segment_sizes.is_empty() {
            return 0.0;
        }
        let avg = self.size as f64 / self.segment_sizes.len() as f64;
        let max = self.segment_sizes.iter().copied().max().unwrap_or(0);
        max as f64 / avg
    }
}
