use crate::cursor::{Cursor, SizeEstimate};
use crate::flags::StreamFlags;

/// Borrowing cursor over a slice; splits at the midpoint.
#[derive(Debug, Clone)]
pub struct SliceCursor<'a, T> {
    slice: &'a [T],
}

impl<'a, T> SliceCursor<'a, T> {
    pub fn new(slice: &'a [T]) -> Self {
        Self { slice }
    }

    pub fn remaining(&self) -> &'a [T] {
        self.slice
    }
}

impl<'a, T: Sync> Cursor for SliceCursor<'a, T> {
    type Item = &'a T;

    fn estimate_size(&self) -> SizeEstimate {
        SizeEstimate::Exact(self.slice.len())
    }

    fn try_split(&mut self) -> Option<Self> {
        if self.slice.len() < 2 {
            return None;
        }
        let (prefix, rest) = self.slice.split_at(self.slice.len() / 2);
        self.slice = rest;
        Some(Self { slice: prefix })
    }

    fn try_advance<F>(&mut self, visitor: F) -> bool
    where
        F: FnOnce(Self::Item),
    {
        let Some((first, rest)) = self.slice.split_first() else {
            return false;
        };
        self.slice = rest;
        visitor(first);
        true
    }

    fn for_each_remaining<F>(&mut self, visitor: F)
    where
        F: FnMut(Self::Item),
    {
        let slice = std::mem::take(&mut self.slice);
        slice.iter().for_each(visitor);
    }

    fn flags(&self) -> StreamFlags {
        StreamFlags::SIZED_ORDERED
    }
}
