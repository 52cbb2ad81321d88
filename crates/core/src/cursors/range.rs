use crate::cursor::{Cursor, SizeEstimate};
use crate::flags::StreamFlags;

/// Cursor over the half-open integer range `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeCursor {
    start: i64,
    end: i64,
}

impl RangeCursor {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end: end.max(start) }
    }

    fn len(&self) -> usize {
        usize::try_from(self.end.abs_diff(self.start)).unwrap_or(usize::MAX)
    }
}

impl From<std::ops::Range<i64>> for RangeCursor {
    fn from(range: std::ops::Range<i64>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl Cursor for RangeCursor {
    type Item = i64;

    fn estimate_size(&self) -> SizeEstimate {
        SizeEstimate::Exact(self.len())
    }

    fn try_split(&mut self) -> Option<Self> {
        if self.len() < 2 {
            return None;
        }
        let mid = self.start.wrapping_add_unsigned(self.end.abs_diff(self.start) / 2);
        let prefix = Self { start: self.start, end: mid };
        self.start = mid;
        Some(prefix)
    }

    fn try_advance<F>(&mut self, visitor: F) -> bool
    where
        F: FnOnce(Self::Item),
    {
        if self.start >= self.end {
            return false;
        }
        let current = self.start;
        self.start += 1;
        visitor(current);
        true
    }

    fn for_each_remaining<F>(&mut self, visitor: F)
    where
        F: FnMut(Self::Item),
    {
        let (start, end) = (self.start, self.end);
        self.start = end;
        (start..end).for_each(visitor);
    }

    fn flags(&self) -> StreamFlags {
        StreamFlags::SIZED_ORDERED | StreamFlags::DISTINCT | StreamFlags::SORTED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 10, 5)]
    #[case(-3, 4, 0)]
    #[case(7, 9, 8)]
    #[case(i64::MIN, i64::MAX, -1)]
    #[case(i64::MAX - 4, i64::MAX, i64::MAX - 2)]
    fn splits_at_midpoint(#[case] start: i64, #[case] end: i64, #[case] mid: i64) {
        let mut cursor = RangeCursor::new(start, end);
        let prefix = cursor.try_split().unwrap();
        assert_eq!(prefix, RangeCursor::new(start, mid));
        assert_eq!(cursor, RangeCursor::new(mid, end));
    }

    #[rstest]
    fn full_width_range_splits_down_to_single_elements() {
        let mut cursor = RangeCursor::new(i64::MIN, i64::MAX);
        assert_eq!(cursor.estimate_size(), SizeEstimate::Exact(usize::MAX));
        while let Some(prefix) = cursor.try_split() {
            assert!(prefix.len() <= cursor.len());
        }
        assert_eq!(cursor, RangeCursor::new(i64::MAX - 1, i64::MAX));
    }

    #[rstest]
    fn reversed_bounds_are_empty() {
        let cursor = RangeCursor::new(5, 1);
        assert_eq!(cursor.estimate_size(), SizeEstimate::Exact(0));
    }
}
