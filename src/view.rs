use crate::invariants::debug_assert_in_read_range;
use std::mem::MaybeUninit;

/// Zero-copy view over the readable range of a ring, handed to the
/// [`try_read`](crate::Ring::try_read) callback.
///
/// The view carries the underlying storage plus one logical half-open
/// interval `[start, end)` that may wrap physically; it is **not** split at
/// the wrap boundary. Wrap-aware indexing (`seq & mask`) is done by the
/// view's accessors, so callers iterate logical indices without touching
/// physical slots:
///
/// ```ignore
/// ring.try_read(|batch| {
///     for seq in batch.start()..batch.end() {
///         sum += *batch.get(seq);
///     }
/// });
/// ```
///
/// The ring treats the entire range as consumed once the callback returns;
/// there is no partial consumption.
pub struct ReadBatch<'a, T> {
    storage: &'a [MaybeUninit<T>],
    start: u64,
    end: u64,
    mask: u64,
}

impl<'a, T> ReadBatch<'a, T> {
    /// Safety contract (upheld by `Ring::try_read`): every logical index in
    /// `[start, end)` maps through `& mask` to an initialized slot.
    pub(crate) fn new(storage: &'a [MaybeUninit<T>], start: u64, end: u64, mask: u64) -> Self {
        Self {
            storage,
            start,
            end,
            mask,
        }
    }

    /// Inclusive start of the readable logical range.
    #[inline]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Exclusive end of the readable logical range.
    #[inline]
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Index mask; `seq & mask` is the physical slot for logical index `seq`.
    #[inline]
    pub fn mask(&self) -> u64 {
        self.mask
    }

    /// Number of readable items.
    #[inline]
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    /// Returns true if the view is empty (never the case inside `try_read`).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the item at logical index `seq`.
    ///
    /// `seq` must lie in `[start, end)`; this is debug-asserted and undefined
    /// behavior in release builds if violated.
    #[inline]
    pub fn get(&self, seq: u64) -> &T {
        debug_assert_in_read_range!(seq, self.start, self.end);
        let idx = (seq & self.mask) as usize;
        // SAFETY: seq is within [start, end), so the producer fully wrote and
        // published this slot before the write head snapshot was taken.
        unsafe { self.storage[idx].assume_init_ref() }
    }

    /// Iterates the items in logical (FIFO) order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, 'a, T> {
        Iter {
            batch: self,
            pos: self.start,
        }
    }
}

impl<'b, 'a, T> IntoIterator for &'b ReadBatch<'a, T> {
    type Item = &'b T;
    type IntoIter = Iter<'b, 'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`ReadBatch`] in FIFO order.
pub struct Iter<'b, 'a, T> {
    batch: &'b ReadBatch<'a, T>,
    pos: u64,
}

impl<'b, 'a, T> Iterator for Iter<'b, 'a, T> {
    type Item = &'b T;

    fn next(&mut self) -> Option<&'b T> {
        if self.pos == self.batch.end {
            return None;
        }
        let item = self.batch.get(self.pos);
        self.pos += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.batch.end - self.pos) as usize;
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, '_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage_of(values: &[u64]) -> Vec<MaybeUninit<u64>> {
        values.iter().map(|&v| MaybeUninit::new(v)).collect()
    }

    #[test]
    fn test_get_projects_through_mask() {
        // Physical slots 0..4, logical range [6, 9) wraps: 6&3=2, 7&3=3, 8&3=0
        let storage = storage_of(&[80, 0, 60, 70]);
        let batch = ReadBatch::new(&storage, 6, 9, 3);

        assert_eq!(batch.len(), 3);
        assert_eq!(*batch.get(6), 60);
        assert_eq!(*batch.get(7), 70);
        assert_eq!(*batch.get(8), 80);
    }

    #[test]
    fn test_iter_fifo_order_across_wrap() {
        let storage = storage_of(&[30, 0, 10, 20]);
        let batch = ReadBatch::new(&storage, 2, 5, 3);

        let collected: Vec<u64> = batch.iter().copied().collect();
        assert_eq!(collected, vec![10, 20, 30]);
        assert_eq!(batch.iter().len(), 3);
    }

    #[test]
    fn test_empty_view() {
        let storage = storage_of(&[0, 0]);
        let batch = ReadBatch::new(&storage, 4, 4, 1);
        assert!(batch.is_empty());
        assert_eq!(batch.iter().count(), 0);
    }
}
