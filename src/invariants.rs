//! Debug assertion macros for the head-counter invariants.
//!
//! These are only active in debug builds (`debug_assert!`), so there is zero
//! overhead in release builds. Contract violations they catch — multi-writer
//! misuse, oversized batches, out-of-range view access — are undefined
//! behavior at runtime, never a recoverable error.

/// Assert that the occupied count never exceeds capacity.
///
/// `0 ≤ (write_head - read_head) ≤ capacity` must hold in every reachable
/// state. Checked after computing the new write head in the publish paths.
macro_rules! debug_assert_bounded_occupancy {
    ($occupied:expr, $capacity:expr) => {
        debug_assert!(
            $occupied <= $capacity,
            "occupied count {} exceeds capacity {}",
            $occupied,
            $capacity
        )
    };
}

/// Assert that a head counter only increases.
///
/// Both heads are unbounded u64 logical counters; at one billion items per
/// second a wrap takes centuries, so a decrease always means a bug.
macro_rules! debug_assert_monotonic {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!(
            $new >= $old,
            "{} decreased from {} to {}",
            $name,
            $old,
            $new
        )
    };
}

/// Assert that the read head does not advance past the write head.
///
/// Checked before publishing the consumed range in `try_read`.
macro_rules! debug_assert_read_not_past_write {
    ($new_read:expr, $write:expr) => {
        debug_assert!(
            $new_read <= $write,
            "advancing read head {} beyond write head {}",
            $new_read,
            $write
        )
    };
}

/// Assert that a logical index lies inside the initialized range handed to
/// the consumer.
///
/// `storage[i & mask]` is initialized iff `read_head ≤ i < write_head`.
/// Checked in `ReadBatch::get` and the drop loop after consumption.
macro_rules! debug_assert_in_read_range {
    ($seq:expr, $start:expr, $end:expr) => {
        debug_assert!(
            $seq >= $start && $seq < $end,
            "logical index {} outside readable range [{}, {})",
            $seq,
            $start,
            $end
        )
    };
}

/// Assert the construction-time batch bound on every batch call.
///
/// The bound is what guarantees a full batch can always be evaluated against
/// total capacity; violating it makes the full-buffer check unsatisfiable.
macro_rules! debug_assert_batch_within_bound {
    ($len:expr, $max_batch:expr) => {
        debug_assert!(
            $len <= $max_batch,
            "batch of {} exceeds configured bound {}",
            $len,
            $max_batch
        )
    };
}

pub(crate) use debug_assert_batch_within_bound;
pub(crate) use debug_assert_bounded_occupancy;
pub(crate) use debug_assert_in_read_range;
pub(crate) use debug_assert_monotonic;
pub(crate) use debug_assert_read_not_past_write;
