use crate::invariants::{
    debug_assert_batch_within_bound, debug_assert_bounded_occupancy, debug_assert_in_read_range,
    debug_assert_monotonic, debug_assert_read_not_past_write,
};
use crate::view::ReadBatch;
use crate::{Config, Metrics};
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// MEMORY ORDERING & SYNCHRONIZATION STRATEGY
// =============================================================================
//
// This SPSC ring buffer uses a classic producer-consumer protocol:
//
// ## Logical Indices (ABA Prevention)
//
// `write_head` and `read_head` are unbounded u64 logical counters, never
// wrapped indices. With 2^64 values a wrap is practically impossible; the
// physical slot is computed as `sequence & mask` only when touching storage.
//
// ## Memory Ordering Protocol
//
// **Producer (`try_add` / `try_add_batch`):**
// 1. Load `write_head` with Relaxed (only the producer writes it)
// 2. Load `cached_read` with no ordering (UnsafeCell, single-writer)
// 3. If cached free space insufficient: load `read_head` with Acquire
//    (synchronizes with the consumer's Release)
// 4. Write data into the slots (no ordering needed - protected by protocol)
// 5. Store `write_head` with Release (publishes the slot writes)
//
// **Consumer (`try_read`):**
// 1. Load `read_head` with Relaxed (only the consumer writes it)
// 2. Load `cached_write` with no ordering (UnsafeCell, single-writer)
// 3. If cache shows empty: load `write_head` with Acquire
//    (synchronizes with the producer's Release)
// 4. Hand `[read_head, write_head)` to the callback, then drop the range
// 5. Store `read_head` with Release (publishes consumption to the producer)
//
// The Release on `write_head` paired with the consumer's Acquire is the
// load-bearing correctness property: a consumer that observes the new write
// head is guaranteed to observe the slot contents written before it.
//
// ## Single-Writer Invariants
//
// Fields accessed via UnsafeCell without atomics, each with exactly one
// writer for the lifetime of the session:
// - `cached_read`: written and read only by the producer
// - `cached_write`: written and read only by the consumer
// - `buffer[idx]`: written by the producer before the write-head publish,
//   read by the consumer between the write-head load and the read-head store
//
// A stale cache only underestimates what the other side has published, so
// the fast paths can never over-claim space or data.
//
// =============================================================================

/// Bounded lock-free SPSC ring buffer.
///
/// Moves values from one producer thread to one consumer thread without
/// locks, allocation, or copying beyond the element storage itself. All
/// operations complete immediately: the boolean return is the only signal
/// for "full" / "empty", and callers bring their own backoff.
///
/// # Contract
///
/// NOT safe to drive from more than one thread per side: exactly one thread
/// may call the `try_add*` methods and exactly one thread may call
/// [`try_read`](Self::try_read) for the lifetime of the ring. The type is
/// `Sync` so the two sides can share it behind an `Arc`; honoring the
/// one-thread-per-side discipline is up to the caller.
///
/// Optimized with:
/// - 128-byte alignment to prevent false sharing between the two heads
/// - Cached head counters to minimize cross-core traffic
/// - Batch operations that publish many slots with one atomic store
#[repr(C)]
pub struct Ring<T> {
    // === PRODUCER HOT === (128-byte aligned)
    /// Next logical slot to write (written by producer, read by consumer)
    write_head: CacheAligned<AtomicU64>,
    /// Producer's cached view of `read_head` (avoids cross-core reads)
    cached_read: CacheAligned<UnsafeCell<u64>>,

    // === CONSUMER HOT === (128-byte aligned)
    /// Next logical slot to read (written by consumer, read by producer)
    read_head: CacheAligned<AtomicU64>,
    /// Consumer's cached view of `write_head` (avoids cross-core reads)
    cached_write: CacheAligned<UnsafeCell<u64>>,

    // === COLD STATE ===
    /// Thread-safe counters (uses atomics internally)
    metrics: Metrics,
    config: Config,

    // === DATA BUFFER ===
    /// Fixed ring storage.
    ///
    /// `Box<[T]>` instead of `Vec<T>`: the size is fixed at construction and
    /// the slots are overwritten in place, never reallocated.
    buffer: UnsafeCell<Box<[MaybeUninit<T>]>>,
}

// Safety: Ring is Send + Sync as long as T is Send.
// The head atomics plus the one-thread-per-side contract provide the
// synchronization for all storage access.
unsafe impl<T: Send> Send for Ring<T> {}
unsafe impl<T: Send> Sync for Ring<T> {}

impl<T> Ring<T> {
    /// Creates an empty ring with `config.capacity()` pre-allocated slots.
    ///
    /// Both heads start at zero. The capacity shape (power of two, strictly
    /// larger than `max_batch`) is enforced by [`Config`] construction.
    pub fn new(config: Config) -> Self {
        let capacity = config.capacity();

        let mut buffer = Vec::with_capacity(capacity);
        buffer.resize_with(capacity, MaybeUninit::uninit);
        let buffer = buffer.into_boxed_slice();

        Self {
            write_head: CacheAligned::new(AtomicU64::new(0)),
            cached_read: CacheAligned::new(UnsafeCell::new(0)),
            read_head: CacheAligned::new(AtomicU64::new(0)),
            cached_write: CacheAligned::new(UnsafeCell::new(0)),
            metrics: Metrics::new(),
            config,
            buffer: UnsafeCell::new(buffer),
        }
    }

    // ---------------------------------------------------------------------
    // STATUS
    // ---------------------------------------------------------------------

    /// Returns the ring buffer capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    /// Returns the index mask for wrapping.
    #[inline]
    fn mask(&self) -> usize {
        self.config.mask()
    }

    /// Returns the current number of occupied slots.
    #[inline]
    pub fn len(&self) -> usize {
        let write = self.write_head.load(Ordering::Relaxed);
        let read = self.read_head.load(Ordering::Relaxed);
        write.wrapping_sub(read) as usize
    }

    /// Returns true if the ring is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.write_head.load(Ordering::Relaxed) == self.read_head.load(Ordering::Relaxed)
    }

    /// Returns true if the ring is full.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    // ---------------------------------------------------------------------
    // PRODUCER API
    // ---------------------------------------------------------------------

    /// Enqueue a single value. Returns `false` if the ring is full.
    ///
    /// Producer-only: must be called from the single designated producer
    /// thread. On `false` no mutation has happened; retry with your own
    /// backoff.
    #[inline]
    pub fn try_add(&self, value: T) -> bool {
        let write = self.write_head.load(Ordering::Relaxed);
        if !self.ensure_free(write, 1) {
            return false;
        }

        let idx = (write as usize) & self.mask();
        // SAFETY: ensure_free confirmed this slot is past the read head, so
        // the consumer is not touching it; only the producer writes between
        // the read head and the write head, and the Release publish below
        // makes the write visible before the new write head.
        unsafe {
            (*self.buffer.get())[idx].write(value);
        }

        self.publish_write(write, 1);

        if self.config.enable_metrics {
            self.metrics.add_items_enqueued(1);
        }
        true
    }

    /// Enqueue a batch, all-or-nothing. Returns `false` if fewer than
    /// `values.len()` slots are free, in which case **no partial write** has
    /// happened — neither storage nor counters changed.
    ///
    /// Producer-only. `values.len()` must not exceed the configured
    /// `max_batch` bound; this is debug-asserted and undefined in release
    /// builds if violated (the full-buffer check could never succeed). The
    /// empty batch trivially succeeds.
    pub fn try_add_batch(&self, values: &[T]) -> bool
    where
        T: Clone,
    {
        debug_assert_batch_within_bound!(values.len(), self.config.max_batch);

        let write = self.write_head.load(Ordering::Relaxed);
        if !self.ensure_free(write, values.len()) {
            return false;
        }

        let mask = self.mask();
        // SAFETY: ensure_free confirmed values.len() free slots starting at
        // `write`; each successive index wraps through the mask and stays
        // ahead of the read head, so the consumer cannot observe these slots
        // until the Release publish below.
        unsafe {
            let buffer = &mut *self.buffer.get();
            for (i, value) in values.iter().enumerate() {
                buffer[(write as usize).wrapping_add(i) & mask].write(value.clone());
            }
        }

        self.publish_write(write, values.len());

        if self.config.enable_metrics {
            self.metrics.add_items_enqueued(values.len() as u64);
            self.metrics.add_batches_enqueued(1);
        }
        true
    }

    /// Enqueue a batch from an iterator, transferring ownership.
    ///
    /// Same all-or-nothing contract as [`try_add_batch`](Self::try_add_batch),
    /// for element types that are expensive (or impossible) to clone. The
    /// iterator's reported length is trusted for the capacity check; yielding
    /// fewer items publishes only what was yielded.
    pub fn try_add_iter<I>(&self, items: I) -> bool
    where
        I: ExactSizeIterator<Item = T>,
    {
        let n = items.len();
        debug_assert_batch_within_bound!(n, self.config.max_batch);

        let write = self.write_head.load(Ordering::Relaxed);
        if !self.ensure_free(write, n) {
            return false;
        }

        let mask = self.mask();
        let mut count = 0usize;
        // SAFETY: as in try_add_batch; at most n slots are written, all
        // within the free range confirmed above.
        unsafe {
            let buffer = &mut *self.buffer.get();
            for (i, value) in items.enumerate().take(n) {
                buffer[(write as usize).wrapping_add(i) & mask].write(value);
                count += 1;
            }
        }
        debug_assert!(count == n, "iterator yielded {count} of {n} reported items");

        self.publish_write(write, count);

        if self.config.enable_metrics {
            self.metrics.add_items_enqueued(count as u64);
            self.metrics.add_batches_enqueued(1);
        }
        true
    }

    /// Checks for `n` free slots at write position `write`.
    ///
    /// Fast path uses the cached read head; the slow path refreshes it with
    /// an Acquire load paired with the consumer's Release store.
    #[inline]
    fn ensure_free(&self, write: u64, n: usize) -> bool {
        // SAFETY: cached_read is only written by the producer (this code
        // path), so the unsynchronized read is safe.
        let cached = unsafe { *self.cached_read.get() };
        let free = self
            .capacity()
            .saturating_sub(write.wrapping_sub(cached) as usize);
        if free >= n {
            return true;
        }

        let read = self.read_head.load(Ordering::Acquire);
        // SAFETY: as above; the Acquire load synchronizes with the
        // consumer's Release store before the cache is overwritten.
        unsafe {
            *self.cached_read.get() = read;
        }

        self.capacity()
            .saturating_sub(write.wrapping_sub(read) as usize)
            >= n
    }

    /// Publishes `n` written slots with a single Release store.
    #[inline]
    fn publish_write(&self, write: u64, n: usize) {
        let new_write = write.wrapping_add(n as u64);
        let read = self.read_head.load(Ordering::Relaxed);

        debug_assert_bounded_occupancy!(new_write.wrapping_sub(read) as usize, self.capacity());
        debug_assert_monotonic!("write_head", write, new_write);

        self.write_head.store(new_write, Ordering::Release);
    }

    // ---------------------------------------------------------------------
    // CONSUMER API
    // ---------------------------------------------------------------------

    /// Dequeue everything currently readable through a callback. Returns
    /// `false` if the ring is empty, without invoking the callback.
    ///
    /// Consumer-only: must be called from the single designated consumer
    /// thread. The callback is invoked exactly once with a [`ReadBatch`]
    /// spanning `[read_head, write_head)` — one logical interval that may
    /// wrap physically; the view's accessors do the `& mask` projection.
    ///
    /// When the callback returns, the **entire** range is treated as
    /// consumed: the items are dropped and the read head jumps to the write
    /// head snapshot. There is no partial consumption — a callback that
    /// skips items silently loses them.
    ///
    /// Handing out the raw storage window instead of copying into a fresh
    /// buffer is what keeps this path allocation- and copy-free.
    pub fn try_read<F>(&self, consumer: F) -> bool
    where
        F: FnOnce(ReadBatch<'_, T>),
    {
        let read = self.read_head.load(Ordering::Relaxed);

        // Fast path: check the cached write head.
        // SAFETY: cached_write is only written by the consumer (this code
        // path), so the unsynchronized read is safe.
        let mut write = unsafe { *self.cached_write.get() };
        if write == read {
            // Slow path: refresh the cache.
            write = self.write_head.load(Ordering::Acquire);
            // SAFETY: as above; the Acquire load synchronizes with the
            // producer's Release store.
            unsafe {
                *self.cached_write.get() = write;
            }
            if write == read {
                return false;
            }
        }

        let mask = self.mask() as u64;
        // SAFETY: slots in [read, write) were fully written by the producer
        // and published via Release before `write` became observable; the
        // Acquire load that produced `write` (now or on an earlier refresh)
        // pairs with that store. The shared borrow ends with the callback,
        // before the drop loop below takes a unique one.
        let storage: &[MaybeUninit<T>] = unsafe { &*self.buffer.get() };
        consumer(ReadBatch::new(storage, read, write, mask));

        // The callback only borrowed the items; the ring still owns them and
        // must dispose of them before the producer reuses the slots.
        if std::mem::needs_drop::<T>() {
            // SAFETY: every index in [read, write) is initialized and will
            // not be read again once the read head advances past it.
            unsafe {
                let buffer = &mut *self.buffer.get();
                let mut pos = read;
                while pos != write {
                    debug_assert_in_read_range!(pos, read, write);
                    ptr::drop_in_place(buffer[(pos & mask) as usize].as_mut_ptr());
                    pos = pos.wrapping_add(1);
                }
            }
        }

        debug_assert_monotonic!("read_head", read, write);
        debug_assert_read_not_past_write!(write, self.write_head.load(Ordering::Relaxed));

        // Single atomic update for the entire range.
        self.read_head.store(write, Ordering::Release);

        if self.config.enable_metrics {
            self.metrics
                .add_items_dequeued(write.wrapping_sub(read));
            self.metrics.add_batches_dequeued(1);
        }
        true
    }

    /// Get a snapshot of metrics if enabled.
    pub fn metrics(&self) -> crate::MetricsSnapshot {
        if self.config.enable_metrics {
            self.metrics.snapshot()
        } else {
            crate::MetricsSnapshot::default()
        }
    }
}

impl<T> Drop for Ring<T> {
    fn drop(&mut self) {
        // Drop whatever is still occupied when the session is abandoned.
        let read = self.read_head.load(Ordering::Relaxed);
        let write = self.write_head.load(Ordering::Relaxed);
        let count = write.wrapping_sub(read) as usize;

        if count > 0 {
            let mask = self.mask();
            let buffer = self.buffer.get_mut();

            for i in 0..count {
                let idx = ((read as usize).wrapping_add(i)) & mask;
                unsafe {
                    ptr::drop_in_place(buffer[idx].as_mut_ptr());
                }
            }
        }
    }
}

// ---------------------------------------------------------------------
// HELPER: 128-byte cache-aligned wrapper
// ---------------------------------------------------------------------

/// Wrapper type that ensures 128-byte alignment to prevent prefetcher-induced
/// false sharing on Intel/AMD CPUs (which may prefetch adjacent cache lines).
#[repr(align(128))]
struct CacheAligned<T> {
    value: T,
}

impl<T> CacheAligned<T> {
    const fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T> std::ops::Deref for CacheAligned<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}
