use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for ring activity.
///
/// Updated only when [`Config::enable_metrics`](crate::Config) is set; the
/// producer and consumer touch disjoint counters so relaxed increments are
/// sufficient.
#[derive(Debug, Default)]
pub struct Metrics {
    items_enqueued: AtomicU64,
    items_dequeued: AtomicU64,
    batches_enqueued: AtomicU64,
    batches_dequeued: AtomicU64,
}

impl Metrics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn add_items_enqueued(&self, n: u64) {
        self.items_enqueued.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_items_dequeued(&self, n: u64) {
        self.items_dequeued.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_batches_enqueued(&self, n: u64) {
        self.batches_enqueued.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_batches_dequeued(&self, n: u64) {
        self.batches_dequeued.fetch_add(n, Ordering::Relaxed);
    }

    /// Takes a point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            items_enqueued: self.items_enqueued.load(Ordering::Relaxed),
            items_dequeued: self.items_dequeued.load(Ordering::Relaxed),
            batches_enqueued: self.batches_enqueued.load(Ordering::Relaxed),
            batches_dequeued: self.batches_dequeued.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the ring counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub items_enqueued: u64,
    pub items_dequeued: u64,
    pub batches_enqueued: u64,
    pub batches_dequeued: u64,
}
