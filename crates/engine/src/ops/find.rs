//! Finding the first element, or any element, of a pipeline's output.

use std::marker::PhantomData;

use parastream_core::{Cursor, Sink};

use super::TerminalOp;
use crate::engine::Engine;
use crate::error::Result;
use crate::pipeline::{PipelineHelper, Stage};
use crate::task::short_circuit::{self, ShortCircuitContext, ShortCircuitTask};

/// Keeps the first element it receives.
pub struct FindSink<'a, T> {
    found: Option<T>,
    context: Option<&'a ShortCircuitContext<'a, Option<T>>>,
}

impl<'a, T> FindSink<'a, T> {
    pub fn new() -> Self {
        Self { found: None, context: None }
    }

    #[must_use]
    pub fn with_context(mut self, context: &'a ShortCircuitContext<'a, Option<T>>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn into_found(self) -> Option<T> {
        self.found
    }
}

impl<T> Default for FindSink<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Sink<T> for FindSink<'_, T> {
    fn accept(&mut self, item: T) {
        if self.found.is_none() {
            self.found = Some(item);
        }
    }

    fn cancellation_requested(&self) -> bool {
        self.found.is_some() || self.context.is_some_and(ShortCircuitContext::is_finished)
    }
}

/// `must_find_first` asks for the earliest element in encounter order; otherwise any element will
/// do and the first one seen by any task wins.
#[derive(Debug, Clone, Copy)]
pub struct FindOp {
    must_find_first: bool,
}

impl FindOp {
    pub const FIRST: Self = Self { must_find_first: true };
    pub const ANY: Self = Self { must_find_first: false };

    pub fn must_find_first(self) -> bool {
        self.must_find_first
    }
}

impl<St> TerminalOp<St> for FindOp
where
    St: Stage,
    St::Out: Clone + Send + Sync,
{
    type Output = Option<St::Out>;

    fn evaluate_sequential<C>(&self, helper: &PipelineHelper<'_, St>, cursor: C) -> Option<St::Out>
    where
        C: Cursor<Item = St::In>,
    {
        let mut sink = FindSink::new();
        helper.wrap_and_drive_with_cancellation(&mut sink, cursor);
        sink.into_found()
    }

    fn evaluate_parallel<C>(
        &self,
        engine: &Engine,
        helper: &PipelineHelper<'_, St>,
        cursor: C,
    ) -> Result<Option<St::Out>>
    where
        C: Cursor<Item = St::In>,
    {
        let task = FindTask { helper, must_find_first: self.must_find_first, cursor: PhantomData };
        short_circuit::invoke(engine, task, cursor)
    }
}

struct FindTask<'h, 'p, St, C> {
    helper: &'h PipelineHelper<'p, St>,
    must_find_first: bool,
    cursor: PhantomData<fn() -> C>,
}

impl<St, C> FindTask<'_, '_, St, C>
where
    St: Stage,
    St::Out: Clone,
{
    /// Publishes `found` when no earlier element can exist, otherwise cancels everything after it.
    fn found_candidate(&self, context: &ShortCircuitContext<'_, Option<St::Out>>, found: &St::Out) {
        if context.is_leftmost() {
            context.declare(Some(found.clone()));
        } else {
            context.cancel_later_nodes();
        }
    }
}

impl<St, C> ShortCircuitTask for FindTask<'_, '_, St, C>
where
    St: Stage,
    St::Out: Clone + Send + Sync,
    C: Cursor<Item = St::In>,
{
    type Cursor = C;
    type Value = Option<St::Out>;

    fn make_child(&self) -> Self {
        Self { helper: self.helper, must_find_first: self.must_find_first, cursor: PhantomData }
    }

    fn leaf(&self, context: &ShortCircuitContext<'_, Self::Value>, cursor: C) -> Option<Self::Value> {
        let mut sink = FindSink::new().with_context(context);
        self.helper.wrap_and_drive_with_cancellation(&mut sink, cursor);
        let found = sink.into_found()?;
        if self.must_find_first {
            self.found_candidate(context, &found);
            Some(Some(found))
        } else {
            context.declare(Some(found));
            None
        }
    }

    fn merge(
        &self,
        context: &ShortCircuitContext<'_, Self::Value>,
        left: Option<Self::Value>,
        right: Option<Self::Value>,
    ) -> Option<Self::Value> {
        let merged = left.or(right);
        if self.must_find_first
            && let Some(Some(found)) = &merged
        {
            self.found_candidate(context, found);
        }
        merged
    }

    fn empty_result(&self) -> Self::Value {
        None
    }

    fn splittable(&self) -> bool {
        !self.helper.is_stateful()
    }
}

pub fn find_first<St, C>(helper: &PipelineHelper<'_, St>, cursor: C) -> Result<Option<St::Out>>
where
    St: Stage,
    St::Out: Clone + Send + Sync,
    C: Cursor<Item = St::In>,
{
    FindOp::FIRST.evaluate(helper, cursor)
}

pub fn find_any<St, C>(helper: &PipelineHelper<'_, St>, cursor: C) -> Result<Option<St::Out>>
where
    St: Stage,
    St::Out: Clone + Send + Sync,
    C: Cursor<Item = St::In>,
{
    FindOp::ANY.evaluate(helper, cursor)
}
