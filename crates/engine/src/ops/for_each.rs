//! Running an action on every element, in no particular order.

use std::marker::PhantomData;

use parastream_core::{Cursor, sink::from_fn};

use super::TerminalOp;
use crate::engine::Engine;
use crate::error::Result;
use crate::pipeline::{PipelineHelper, Stage};
use crate::task::{TaskControl, TreeTask};

pub struct ForEachOp<F> {
    action: F,
}

impl<F> ForEachOp<F> {
    pub fn new(action: F) -> Self {
        Self { action }
    }
}

impl<St, F> TerminalOp<St> for ForEachOp<F>
where
    St: Stage,
    F: Fn(St::Out) + Sync,
{
    type Output = ();

    fn evaluate_sequential<C>(&self, helper: &PipelineHelper<'_, St>, cursor: C)
    where
        C: Cursor<Item = St::In>,
    {
        helper.wrap_and_drive(&mut from_fn(&self.action), cursor);
    }

    fn evaluate_parallel<C>(&self, engine: &Engine, helper: &PipelineHelper<'_, St>, cursor: C) -> Result<()>
    where
        C: Cursor<Item = St::In>,
    {
        engine.invoke(ForEachTask { helper, action: &self.action, cursor: PhantomData }, cursor)
    }
}

struct ForEachTask<'h, 'p, St, C, F> {
    helper: &'h PipelineHelper<'p, St>,
    action: &'h F,
    cursor: PhantomData<fn() -> C>,
}

impl<St, C, F> TreeTask for ForEachTask<'_, '_, St, C, F>
where
    St: Stage,
    C: Cursor<Item = St::In>,
    F: Fn(St::Out) + Sync,
{
    type Cursor = C;
    type Output = ();

    fn make_child(&self) -> Self {
        Self { helper: self.helper, action: self.action, cursor: PhantomData }
    }

    fn leaf(&self, _control: &TaskControl, cursor: C) {
        self.helper.wrap_and_drive(&mut from_fn(self.action), cursor);
    }

    fn merge(&self, _control: &TaskControl, _left: (), _right: ()) {}

    fn splittable(&self) -> bool {
        !self.helper.is_stateful()
    }
}

/// Calls `action` for every output element; in parallel mode calls happen concurrently and in no
/// defined order.
pub fn for_each<St, C, F>(helper: &PipelineHelper<'_, St>, cursor: C, action: F) -> Result<()>
where
    St: Stage,
    C: Cursor<Item = St::In>,
    F: Fn(St::Out) + Sync,
{
    ForEachOp::new(action).evaluate(helper, cursor)
}
