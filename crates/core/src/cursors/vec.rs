use std::collections::VecDeque;

use crate::cursor::{Cursor, SizeEstimate};
use crate::flags::StreamFlags;

/// Owning cursor yielding its elements by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VecCursor<T> {
    items: VecDeque<T>,
}

impl<T> VecCursor<T> {
    pub fn new(items: impl Into<VecDeque<T>>) -> Self {
        Self { items: items.into() }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> FromIterator<T> for VecCursor<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self { items: iter.into_iter().collect() }
    }
}

impl<T: Send> Cursor for VecCursor<T> {
    type Item = T;

    fn estimate_size(&self) -> SizeEstimate {
        SizeEstimate::Exact(self.items.len())
    }

    fn try_split(&mut self) -> Option<Self> {
        if self.items.len() < 2 {
            return None;
        }
        let rest = self.items.split_off(self.items.len() / 2);
        let prefix = std::mem::replace(&mut self.items, rest);
        Some(Self { items: prefix })
    }

    fn try_advance<F>(&mut self, visitor: F) -> bool
    where
        F: FnOnce(Self::Item),
    {
        match self.items.pop_front() {
            Some(item) => {
                visitor(item);
                true
            }
            None => false,
        }
    }

    fn for_each_remaining<F>(&mut self, visitor: F)
    where
        F: FnMut(Self::Item),
    {
        self.items.drain(..).for_each(visitor);
    }

    fn flags(&self) -> StreamFlags {
        StreamFlags::SIZED_ORDERED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn split_keeps_encounter_order() {
        let mut rest = VecCursor::new(vec![3, 1, 3, 2, 1]);
        let mut prefix = rest.try_split().unwrap();
        let mut seen = Vec::new();
        prefix.for_each_remaining(|x| seen.push(x));
        rest.for_each_remaining(|x| seen.push(x));
        assert_eq!(seen, vec![3, 1, 3, 2, 1]);
    }
}
