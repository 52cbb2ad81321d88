//! Quantified predicate matching: any, all and none.

use std::marker::PhantomData;

use parastream_core::{Cursor, Sink};

use super::TerminalOp;
use crate::engine::Engine;
use crate::error::Result;
use crate::pipeline::{PipelineHelper, Stage};
use crate::task::short_circuit::{self, ShortCircuitContext, ShortCircuitTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// Some element satisfies the predicate.
    Any,
    /// Every element satisfies the predicate.
    All,
    /// No element satisfies the predicate.
    None,
}

impl MatchKind {
    /// Predicate outcome that decides the match.
    pub const fn stop_on_predicate_matches(self) -> bool {
        match self {
            MatchKind::Any | MatchKind::None => true,
            MatchKind::All => false,
        }
    }

    /// Result once a deciding element has been seen.
    pub const fn short_circuit_result(self) -> bool {
        match self {
            MatchKind::Any => true,
            MatchKind::All | MatchKind::None => false,
        }
    }

    /// Result when no element decides the match, including for empty input.
    pub const fn default_result(self) -> bool {
        !self.short_circuit_result()
    }
}

/// Evaluates the predicate until one element decides the match.
///
/// With a context attached the sink also stops once another task has declared the answer.
pub struct MatchSink<'a, P> {
    kind: MatchKind,
    predicate: &'a P,
    decision: Option<bool>,
    context: Option<&'a ShortCircuitContext<'a, bool>>,
}

impl<'a, P> MatchSink<'a, P> {
    pub fn new(kind: MatchKind, predicate: &'a P) -> Self {
        Self { kind, predicate, decision: None, context: None }
    }

    #[must_use]
    pub fn with_context(mut self, context: &'a ShortCircuitContext<'a, bool>) -> Self {
        self.context = Some(context);
        self
    }

    /// The short-circuit result, if a deciding element was seen.
    pub fn decision(&self) -> Option<bool> {
        self.decision
    }

    pub fn result(&self) -> bool {
        self.decision.unwrap_or(self.kind.default_result())
    }
}

impl<T, P> Sink<T> for MatchSink<'_, P>
where
    P: Fn(&T) -> bool,
{
    fn accept(&mut self, item: T) {
        if self.decision.is_none() && (self.predicate)(&item) == self.kind.stop_on_predicate_matches() {
            self.decision = Some(self.kind.short_circuit_result());
        }
    }

    fn cancellation_requested(&self) -> bool {
        self.decision.is_some() || self.context.is_some_and(ShortCircuitContext::is_finished)
    }
}

pub struct MatchOp<P> {
    kind: MatchKind,
    predicate: P,
}

impl<P> MatchOp<P> {
    pub fn new(kind: MatchKind, predicate: P) -> Self {
        Self { kind, predicate }
    }

    pub fn kind(&self) -> MatchKind {
        self.kind
    }
}

impl<St, P> TerminalOp<St> for MatchOp<P>
where
    St: Stage,
    P: Fn(&St::Out) -> bool + Sync,
{
    type Output = bool;

    fn evaluate_sequential<C>(&self, helper: &PipelineHelper<'_, St>, cursor: C) -> bool
    where
        C: Cursor<Item = St::In>,
    {
        let mut sink = MatchSink::new(self.kind, &self.predicate);
        helper.wrap_and_drive_with_cancellation(&mut sink, cursor);
        sink.result()
    }

    fn evaluate_parallel<C>(&self, engine: &Engine, helper: &PipelineHelper<'_, St>, cursor: C) -> Result<bool>
    where
        C: Cursor<Item = St::In>,
    {
        short_circuit::invoke(engine, MatchTask { helper, op: self, cursor: PhantomData }, cursor)
    }
}

struct MatchTask<'h, 'p, St, C, P> {
    helper: &'h PipelineHelper<'p, St>,
    op: &'h MatchOp<P>,
    cursor: PhantomData<fn() -> C>,
}

impl<St, C, P> ShortCircuitTask for MatchTask<'_, '_, St, C, P>
where
    St: Stage,
    C: Cursor<Item = St::In>,
    P: Fn(&St::Out) -> bool + Sync,
{
    type Cursor = C;
    type Value = bool;

    fn make_child(&self) -> Self {
        Self { helper: self.helper, op: self.op, cursor: PhantomData }
    }

    fn leaf(&self, context: &ShortCircuitContext<'_, bool>, cursor: C) -> Option<bool> {
        let mut sink = MatchSink::new(self.op.kind, &self.op.predicate).with_context(context);
        self.helper.wrap_and_drive_with_cancellation(&mut sink, cursor);
        if let Some(decision) = sink.decision() {
            context.declare(decision);
        }
        None
    }

    fn empty_result(&self) -> bool {
        self.op.kind.default_result()
    }

    fn splittable(&self) -> bool {
        !self.helper.is_stateful()
    }
}

pub fn any<St, C, P>(helper: &PipelineHelper<'_, St>, cursor: C, predicate: P) -> Result<bool>
where
    St: Stage,
    C: Cursor<Item = St::In>,
    P: Fn(&St::Out) -> bool + Sync,
{
    MatchOp::new(MatchKind::Any, predicate).evaluate(helper, cursor)
}

pub fn all<St, C, P>(helper: &PipelineHelper<'_, St>, cursor: C, predicate: P) -> Result<bool>
where
    St: Stage,
    C: Cursor<Item = St::In>,
    P: Fn(&St::Out) -> bool + Sync,
{
    MatchOp::new(MatchKind::All, predicate).evaluate(helper, cursor)
}

pub fn none<St, C, P>(helper: &PipelineHelper<'_, St>, cursor: C, predicate: P) -> Result<bool>
where
    St: Stage,
    C: Cursor<Item = St::In>,
    P: Fn(&St::Out) -> bool + Sync,
{
    MatchOp::new(MatchKind::None, predicate).evaluate(helper, cursor)
}
