//! Duplicate removal.
//!
//! The strategy depends on what is known about the pipeline: output already flagged distinct is
//! materialized as is, sorted output only needs to compare neighbours, ordered parallel output is
//! reduced into insertion-ordered sets and unordered parallel output goes into one concurrent set.

use std::collections::HashSet;
use std::hash::Hash;

use dashmap::DashSet;
use indexmap::IndexSet;
use parastream_core::{Cursor, Sink, StreamFlags};

use super::TerminalOp;
use super::collect;
use super::for_each::ForEachOp;
use super::reduce::ReduceOp;
use crate::engine::Engine;
use crate::error::Result;
use crate::pipeline::{Node, NodeBuilder, PipelineHelper, Stage};

enum Seen<T> {
    /// Sorted input: only the previous element can be equal.
    Adjacent(Option<T>),
    Hashed(HashSet<T>),
}

/// Forwards each element the first time it is seen.
pub struct DistinctSink<T, S> {
    seen: Seen<T>,
    downstream: S,
}

impl<T, S> DistinctSink<T, S> {
    /// `sorted` enables the neighbour comparison instead of a hash set.
    pub fn new(sorted: bool, downstream: S) -> Self {
        let seen = if sorted { Seen::Adjacent(None) } else { Seen::Hashed(HashSet::new()) };
        Self { seen, downstream }
    }
}

impl<T, S> Sink<T> for DistinctSink<T, S>
where
    T: Eq + Hash + Clone,
    S: Sink<T>,
{
    fn begin(&mut self, _expected: Option<usize>) {
        match &mut self.seen {
            Seen::Adjacent(last) => *last = None,
            Seen::Hashed(set) => set.clear(),
        }
        self.downstream.begin(None);
    }

    fn accept(&mut self, item: T) {
        let fresh = match &mut self.seen {
            Seen::Adjacent(last) => {
                if last.as_ref() == Some(&item) {
                    false
                } else {
                    *last = Some(item.clone());
                    true
                }
            }
            Seen::Hashed(set) => set.insert(item.clone()),
        };
        if fresh {
            self.downstream.accept(item);
        }
    }

    fn end(&mut self) {
        self.seen = match &self.seen {
            Seen::Adjacent(_) => Seen::Adjacent(None),
            Seen::Hashed(_) => Seen::Hashed(HashSet::new()),
        };
        self.downstream.end();
    }

    fn cancellation_requested(&self) -> bool {
        self.downstream.cancellation_requested()
    }
}

/// Keeps the first occurrence of every element; ordered pipelines keep encounter order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistinctOp;

impl<St> TerminalOp<St> for DistinctOp
where
    St: Stage,
    St::Out: Eq + Hash + Clone + Send + Sync,
{
    type Output = Node<St::Out>;

    fn evaluate_sequential<C>(&self, helper: &PipelineHelper<'_, St>, cursor: C) -> Node<St::Out>
    where
        C: Cursor<Item = St::In>,
    {
        if helper.has_flag(StreamFlags::DISTINCT) {
            return helper.fill_node(cursor, &NodeBuilder::for_size);
        }
        let mut builder = NodeBuilder::growable();
        {
            let mut sink = DistinctSink::new(helper.has_flag(StreamFlags::SORTED), &mut builder);
            helper.wrap_and_drive(&mut sink, cursor);
        }
        builder.build()
    }

    fn evaluate_parallel<C>(
        &self,
        engine: &Engine,
        helper: &PipelineHelper<'_, St>,
        cursor: C,
    ) -> Result<Node<St::Out>>
    where
        C: Cursor<Item = St::In>,
    {
        if helper.has_flag(StreamFlags::DISTINCT) {
            return collect::collect(engine, helper, cursor, &NodeBuilder::for_size);
        }

        if helper.has_flag(StreamFlags::ORDERED) {
            let reducer = ReduceOp::new(
                IndexSet::new,
                |set: &mut IndexSet<St::Out>, item: St::Out| {
                    set.insert(item);
                },
                |mut left: IndexSet<St::Out>, right: IndexSet<St::Out>| {
                    left.extend(right);
                    left
                },
            );
            let unique = reducer.evaluate_parallel(engine, helper, cursor)?;
            return Ok(Node::Leaf(unique.into_iter().collect()));
        }

        let seen: DashSet<St::Out> = DashSet::new();
        ForEachOp::new(|item: St::Out| {
            seen.insert(item);
        })
        .evaluate_parallel(engine, helper, cursor)?;
        Ok(Node::Leaf(seen.into_iter().collect()))
    }
}

/// Duplicate-free output of the pipeline.
pub fn distinct<St, C>(helper: &PipelineHelper<'_, St>, cursor: C) -> Result<Node<St::Out>>
where
    St: Stage,
    St::Out: Eq + Hash + Clone + Send + Sync,
    C: Cursor<Item = St::In>,
{
    DistinctOp.evaluate(helper, cursor)
}
