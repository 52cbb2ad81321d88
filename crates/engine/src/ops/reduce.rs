//! Folding a pipeline into a single value.

use std::marker::PhantomData;
use std::ops::AddAssign;

use parastream_core::{Cursor, Sink};

use super::TerminalOp;
use crate::engine::Engine;
use crate::error::Result;
use crate::pipeline::{PipelineHelper, Stage};
use crate::task::{TaskControl, TreeTask};

/// Accumulates elements into a value with a fold function.
pub struct FoldSink<'f, R, F> {
    acc: R,
    fold: &'f F,
}

impl<'f, R, F> FoldSink<'f, R, F> {
    pub fn new(acc: R, fold: &'f F) -> Self {
        Self { acc, fold }
    }

    pub fn into_inner(self) -> R {
        self.acc
    }
}

impl<T, R, F> Sink<T> for FoldSink<'_, R, F>
where
    F: Fn(&mut R, T),
{
    fn accept(&mut self, item: T) {
        (self.fold)(&mut self.acc, item);
    }
}

/// Reduction described by a fresh accumulator, a fold step and a combiner for partial results.
///
/// Partial results are combined left before right, so `combine` only needs to be associative.
pub struct ReduceOp<I, F, M> {
    identity: I,
    fold: F,
    combine: M,
}

impl<I, F, M> ReduceOp<I, F, M> {
    pub fn new(identity: I, fold: F, combine: M) -> Self {
        Self { identity, fold, combine }
    }
}

impl<St, I, F, M, R> TerminalOp<St> for ReduceOp<I, F, M>
where
    St: Stage,
    I: Fn() -> R + Sync,
    F: Fn(&mut R, St::Out) + Sync,
    M: Fn(R, R) -> R + Sync,
    R: Send,
{
    type Output = R;

    fn evaluate_sequential<C>(&self, helper: &PipelineHelper<'_, St>, cursor: C) -> R
    where
        C: Cursor<Item = St::In>,
    {
        let mut sink = FoldSink::new((self.identity)(), &self.fold);
        helper.wrap_and_drive(&mut sink, cursor);
        sink.into_inner()
    }

    fn evaluate_parallel<C>(&self, engine: &Engine, helper: &PipelineHelper<'_, St>, cursor: C) -> Result<R>
    where
        C: Cursor<Item = St::In>,
    {
        engine.invoke(ReduceTask { helper, op: self, cursor: PhantomData }, cursor)
    }
}

struct ReduceTask<'h, 'p, St, C, I, F, M> {
    helper: &'h PipelineHelper<'p, St>,
    op: &'h ReduceOp<I, F, M>,
    cursor: PhantomData<fn() -> C>,
}

impl<St, C, I, F, M, R> TreeTask for ReduceTask<'_, '_, St, C, I, F, M>
where
    St: Stage,
    C: Cursor<Item = St::In>,
    I: Fn() -> R + Sync,
    F: Fn(&mut R, St::Out) + Sync,
    M: Fn(R, R) -> R + Sync,
    R: Send,
{
    type Cursor = C;
    type Output = R;

    fn make_child(&self) -> Self {
        Self { helper: self.helper, op: self.op, cursor: PhantomData }
    }

    fn leaf(&self, _control: &TaskControl, cursor: C) -> R {
        let mut sink = FoldSink::new((self.op.identity)(), &self.op.fold);
        self.helper.wrap_and_drive(&mut sink, cursor);
        sink.into_inner()
    }

    fn merge(&self, _control: &TaskControl, left: R, right: R) -> R {
        (self.op.combine)(left, right)
    }

    fn splittable(&self) -> bool {
        !self.helper.is_stateful()
    }
}

pub fn reduce<St, C, I, F, M, R>(
    helper: &PipelineHelper<'_, St>,
    cursor: C,
    identity: I,
    fold: F,
    combine: M,
) -> Result<R>
where
    St: Stage,
    C: Cursor<Item = St::In>,
    I: Fn() -> R + Sync,
    F: Fn(&mut R, St::Out) + Sync,
    M: Fn(R, R) -> R + Sync,
    R: Send,
{
    ReduceOp::new(identity, fold, combine).evaluate(helper, cursor)
}

/// Sum of the pipeline's output; `Default` supplies zero.
pub fn sum<St, C>(helper: &PipelineHelper<'_, St>, cursor: C) -> Result<St::Out>
where
    St: Stage,
    St::Out: Default + AddAssign + Send,
    C: Cursor<Item = St::In>,
{
    reduce(
        helper,
        cursor,
        <St::Out as Default>::default,
        |acc: &mut St::Out, item| *acc += item,
        |mut left: St::Out, right| {
            left += right;
            left
        },
    )
}
