#![allow(dead_code)]

use std::collections::VecDeque;

use parastream::{Cursor, Engine, EngineConfig, SizeEstimate, StreamFlags};

/// Engine that splits down to single elements unless a cursor refuses.
pub fn fine_grained_engine(threads: usize) -> Engine {
    Engine::new(EngineConfig::default().with_parallelism(threads).with_leaf_size(1)).unwrap()
}

pub fn engine(threads: usize) -> Engine {
    Engine::new(EngineConfig::default().with_parallelism(threads)).unwrap()
}

/// Cursor over owned elements whose split points and refusals come from a seeded generator, so a
/// seed stands for one arbitrary split tree.
pub struct ShuffledSplits<T> {
    items: VecDeque<T>,
    state: u64,
    flags: StreamFlags,
}

impl<T> ShuffledSplits<T> {
    pub fn new(items: impl IntoIterator<Item = T>, seed: u64) -> Self {
        Self { items: items.into_iter().collect(), state: seed | 1, flags: StreamFlags::SIZED_ORDERED }
    }

    pub fn unordered(items: impl IntoIterator<Item = T>, seed: u64) -> Self {
        Self { flags: StreamFlags::SIZED, ..Self::new(items, seed) }
    }

    fn next_random(&mut self) -> u64 {
        // xorshift64
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }
}

impl<T: Send> Cursor for ShuffledSplits<T> {
    type Item = T;

    fn estimate_size(&self) -> SizeEstimate {
        SizeEstimate::Exact(self.items.len())
    }

    fn try_split(&mut self) -> Option<Self> {
        let len = self.items.len();
        if len < 2 || self.next_random() % 5 == 0 {
            return None;
        }
        let at = 1 + usize::try_from(self.next_random() % (len as u64 - 1)).unwrap();
        let rest = self.items.split_off(at);
        let prefix = std::mem::replace(&mut self.items, rest);
        let state = self.next_random().rotate_left(32) | 1;
        Some(Self { items: prefix, state, flags: self.flags })
    }

    fn try_advance<F>(&mut self, visitor: F) -> bool
    where
        F: FnOnce(T),
    {
        match self.items.pop_front() {
            Some(item) => {
                visitor(item);
                true
            }
            None => false,
        }
    }

    fn flags(&self) -> StreamFlags {
        self.flags
    }
}
