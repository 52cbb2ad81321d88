//! Binding a stage chain to a traversal.
//!
//! A [`PipelineHelper`] describes one evaluation: which stages run, what is known about the source
//! and whether the caller asked for sequential or parallel execution. Terminal operations use it
//! to wrap their own sink in the chain and push a cursor's elements through it, once for a
//! sequential evaluation or once per leaf of a task tree.

mod node;
pub mod sinks;
mod stage;

use parastream_core::{Cursor, Sink, StreamFlags};

pub use node::{Node, NodeBuilder};
pub use stage::{Filter, Inspect, Map, Sorted, Source, Stage, StageExt, TakeWhile};

use crate::engine::Engine;
use crate::error::Result;
use crate::ops::collect;

/// How the caller wants a pipeline evaluated.
#[derive(Debug, Clone, Copy)]
pub enum Execution<'e> {
    Sequential,
    Parallel(&'e Engine),
}

pub struct PipelineHelper<'p, St> {
    stages: &'p St,
    source_flags: StreamFlags,
    execution: Execution<'p>,
}

impl<'p, St: Stage> PipelineHelper<'p, St> {
    pub fn new(stages: &'p St, source_flags: StreamFlags, execution: Execution<'p>) -> Self {
        Self { stages, source_flags, execution }
    }

    /// Helper whose source flags are taken from `cursor`.
    pub fn for_cursor<C: Cursor>(stages: &'p St, cursor: &C, execution: Execution<'p>) -> Self {
        Self::new(stages, cursor.flags(), execution)
    }

    pub fn stages(&self) -> &'p St {
        self.stages
    }

    pub fn execution(&self) -> Execution<'p> {
        self.execution
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self.execution, Execution::Parallel(_))
    }

    pub fn source_flags(&self) -> StreamFlags {
        self.source_flags
    }

    /// Flags of the chain's output.
    pub fn combined_flags(&self) -> StreamFlags {
        self.stages.flags(self.source_flags)
    }

    pub fn has_flag(&self, flag: StreamFlags) -> bool {
        self.combined_flags().contains(flag)
    }

    pub fn is_stateful(&self) -> bool {
        self.stages.is_stateful()
    }

    /// Number of elements the chain emits for `cursor`, when that is known before traversal.
    pub fn exact_output_size<C: Cursor>(&self, cursor: &C) -> Option<usize> {
        if self.has_flag(StreamFlags::SIZED) { cursor.exact_size() } else { None }
    }

    /// Puts the stage chain in front of `sink`.
    pub fn wrap<'s, S>(&'s self, sink: S) -> St::Chain<'s, S>
    where
        S: Sink<St::Out> + 's,
    {
        self.stages.wrap_sink(sink)
    }

    /// Pushes every element of `cursor` into `chain`.
    pub fn drive<C, W>(&self, chain: &mut W, mut cursor: C)
    where
        C: Cursor,
        W: Sink<C::Item>,
    {
        chain.begin(cursor.exact_size());
        cursor.for_each_remaining(|item| chain.accept(item));
        chain.end();
    }

    /// Like [`drive`](Self::drive), but stops as soon as `chain` requests cancellation.
    ///
    /// `end` is called either way; the return value tells whether the cursor was left unfinished.
    pub fn drive_with_cancellation<C, W>(&self, chain: &mut W, mut cursor: C) -> bool
    where
        C: Cursor,
        W: Sink<C::Item>,
    {
        chain.begin(cursor.exact_size());
        let mut cancelled = false;
        loop {
            if chain.cancellation_requested() {
                cancelled = true;
                break;
            }
            if !cursor.try_advance(|item| chain.accept(item)) {
                break;
            }
        }
        chain.end();
        cancelled
    }

    /// Wraps `sink` and drives `cursor` through the chain, polling for cancellation when some stage
    /// can short-circuit.
    pub fn wrap_and_drive<C, S>(&self, sink: &mut S, cursor: C)
    where
        C: Cursor<Item = St::In>,
        S: Sink<St::Out>,
    {
        let mut chain = self.wrap(sink);
        if self.has_flag(StreamFlags::SHORT_CIRCUIT) {
            self.drive_with_cancellation(&mut chain, cursor);
        } else {
            self.drive(&mut chain, cursor);
        }
    }

    pub fn wrap_and_drive_with_cancellation<C, S>(&self, sink: &mut S, cursor: C) -> bool
    where
        C: Cursor<Item = St::In>,
        S: Sink<St::Out>,
    {
        let mut chain = self.wrap(sink);
        self.drive_with_cancellation(&mut chain, cursor)
    }

    /// Collects the chain's output for `cursor` into a [`Node`].
    ///
    /// `factory` receives the exact output size when known and supplies the builder for each
    /// traversal. In parallel mode every leaf gets its own builder and the results are
    /// concatenated in encounter order; `flatten` copies them into a single leaf afterwards.
    pub fn materialize<C, F>(&self, cursor: C, flatten: bool, factory: F) -> Result<Node<St::Out>>
    where
        C: Cursor<Item = St::In>,
        St::Out: Send,
        F: Fn(Option<usize>) -> NodeBuilder<St::Out> + Sync,
    {
        match self.execution {
            Execution::Sequential => Ok(self.fill_node(cursor, &factory)),
            Execution::Parallel(engine) => {
                let node = collect::collect(engine, self, cursor, &factory)?;
                Ok(if flatten { node.flatten() } else { node })
            }
        }
    }

    pub(crate) fn fill_node<C, F>(&self, cursor: C, factory: &F) -> Node<St::Out>
    where
        C: Cursor<Item = St::In>,
        F: Fn(Option<usize>) -> NodeBuilder<St::Out>,
    {
        let mut builder = factory(self.exact_output_size(&cursor));
        self.wrap_and_drive(&mut builder, cursor);
        builder.build()
    }
}
