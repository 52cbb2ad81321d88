//! Splittable traversal over a slice of a data source.

use crate::flags::StreamFlags;

/// Remaining-element estimate reported by a [`Cursor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SizeEstimate {
    /// Exactly this many elements remain.
    Exact(usize),
    /// Roughly this many elements remain; good enough to size splits.
    Approximate(usize),
    /// The count is unknown or unbounded.
    Unknown,
}

impl SizeEstimate {
    /// The exact count, if known.
    pub const fn exact(self) -> Option<usize> {
        match self {
            SizeEstimate::Exact(n) => Some(n),
            SizeEstimate::Approximate(_) | SizeEstimate::Unknown => None,
        }
    }

    /// The estimate as a number, treating an unknown size as unbounded.
    pub const fn upper_bound(self) -> usize {
        match self {
            SizeEstimate::Exact(n) | SizeEstimate::Approximate(n) => n,
            SizeEstimate::Unknown => usize::MAX,
        }
    }

    pub const fn is_exact(self) -> bool {
        matches!(self, SizeEstimate::Exact(_))
    }
}

/// A slice of a data source that can be visited sequentially or split for parallel work.
///
/// `try_split` hands out a prefix and keeps the remainder, so the two halves partition what the
/// cursor covered before the call with no overlap and no gap. For ordered sources the prefix holds
/// the elements that come first in encounter order.
pub trait Cursor: Send + Sized {
    type Item;

    fn estimate_size(&self) -> SizeEstimate;

    /// Splits off a prefix; `None` when the cursor cannot or will not split any further.
    fn try_split(&mut self) -> Option<Self>;

    /// Hands the next element to `visitor`; returns `false` once the cursor is exhausted.
    fn try_advance<F>(&mut self, visitor: F) -> bool
    where
        F: FnOnce(Self::Item);

    fn for_each_remaining<F>(&mut self, mut visitor: F)
    where
        F: FnMut(Self::Item),
    {
        while self.try_advance(&mut visitor) {}
    }

    /// Source characteristics, e.g. ordered or sized.
    fn flags(&self) -> StreamFlags {
        StreamFlags::empty()
    }

    fn exact_size(&self) -> Option<usize> {
        if self.flags().contains(StreamFlags::SIZED) { self.estimate_size().exact() } else { None }
    }
}
