use std::collections::VecDeque;

use crate::cursor::{Cursor, SizeEstimate};
use crate::flags::StreamFlags;

const BATCH_UNIT: usize = 1 << 10;
const MAX_BATCH: usize = 1 << 25;

/// Cursor over an arbitrary iterator of unknown length.
///
/// Splitting pulls a batch of elements off the iterator into a buffered prefix; each split takes
/// one [`BATCH_UNIT`] more than the previous one, up to [`MAX_BATCH`]. Buffered prefixes split at
/// their midpoint like any array-backed cursor.
pub struct IterCursor<I: Iterator> {
    source: Option<I>,
    buffer: VecDeque<I::Item>,
    batch: usize,
}

impl<I: Iterator> IterCursor<I> {
    pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
        Self { source: Some(iter.into_iter()), buffer: VecDeque::new(), batch: 0 }
    }

    fn buffered(buffer: VecDeque<I::Item>) -> Self {
        Self { source: None, buffer, batch: 0 }
    }
}

impl<I> Cursor for IterCursor<I>
where
    I: Iterator + Send,
    I::Item: Send,
{
    type Item = I::Item;

    fn estimate_size(&self) -> SizeEstimate {
        match &self.source {
            None => SizeEstimate::Exact(self.buffer.len()),
            Some(iter) => match iter.size_hint() {
                (lower, Some(upper)) if lower == upper => SizeEstimate::Exact(self.buffer.len() + upper),
                _ => SizeEstimate::Unknown,
            },
        }
    }

    fn try_split(&mut self) -> Option<Self> {
        let Some(iter) = self.source.as_mut() else {
            if self.buffer.len() < 2 {
                return None;
            }
            let rest = self.buffer.split_off(self.buffer.len() / 2);
            let prefix = std::mem::replace(&mut self.buffer, rest);
            return Some(Self::buffered(prefix));
        };

        self.batch = (self.batch + BATCH_UNIT).min(MAX_BATCH);
        let mut prefix = std::mem::take(&mut self.buffer);
        while prefix.len() < self.batch {
            match iter.next() {
                Some(item) => prefix.push_back(item),
                None => {
                    self.source = None;
                    break;
                }
            }
        }
        if prefix.is_empty() {
            return None;
        }
        Some(Self::buffered(prefix))
    }

    fn try_advance<F>(&mut self, visitor: F) -> bool
    where
        F: FnOnce(Self::Item),
    {
        if let Some(item) = self.buffer.pop_front() {
            visitor(item);
            return true;
        }
        match self.source.as_mut().and_then(Iterator::next) {
            Some(item) => {
                visitor(item);
                true
            }
            None => {
                self.source = None;
                false
            }
        }
    }

    fn for_each_remaining<F>(&mut self, mut visitor: F)
    where
        F: FnMut(Self::Item),
    {
        self.buffer.drain(..).for_each(&mut visitor);
        if let Some(iter) = self.source.take() {
            iter.for_each(visitor);
        }
    }

    fn flags(&self) -> StreamFlags {
        if self.estimate_size().is_exact() { StreamFlags::SIZED_ORDERED } else { StreamFlags::ORDERED }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn unsized_source(n: u32) -> impl Iterator<Item = u32> + Send {
        (0..n).filter(|_| true)
    }

    #[rstest]
    fn first_split_takes_one_batch() {
        let mut cursor = IterCursor::new(unsized_source(5000));
        assert_eq!(cursor.estimate_size(), SizeEstimate::Unknown);
        let prefix = cursor.try_split().unwrap();
        assert_eq!(prefix.estimate_size(), SizeEstimate::Exact(BATCH_UNIT));
        let second = cursor.try_split().unwrap();
        assert_eq!(second.estimate_size(), SizeEstimate::Exact(2 * BATCH_UNIT));
    }

    #[rstest]
    fn splitting_preserves_every_element_once() {
        let mut rest = IterCursor::new(unsized_source(3000));
        let mut parts = Vec::new();
        while let Some(prefix) = rest.try_split() {
            parts.push(prefix);
        }
        parts.push(rest);
        let mut seen = Vec::new();
        for mut part in parts {
            part.for_each_remaining(|x| seen.push(x));
        }
        assert_eq!(seen, (0..3000).collect::<Vec<_>>());
    }

    #[rstest]
    fn exhausted_iterator_does_not_split() {
        let mut cursor = IterCursor::new(unsized_source(0));
        assert!(cursor.try_split().is_none());
        assert!(!cursor.try_advance(|_| unreachable!()));
    }
}
