use std::marker::PhantomData;

use parastream_core::Cursor;

use crate::engine::Engine;
use crate::error::Result;
use crate::pipeline::{Node, NodeBuilder, PipelineHelper, Stage};
use crate::task::{TaskControl, TreeTask};

/// Materializes each leaf into its own node and concatenates them in encounter order.
struct CollectTask<'h, 'p, St, C, F> {
    helper: &'h PipelineHelper<'p, St>,
    factory: &'h F,
    cursor: PhantomData<fn() -> C>,
}

impl<St, C, F> TreeTask for CollectTask<'_, '_, St, C, F>
where
    St: Stage,
    St::Out: Send,
    C: Cursor<Item = St::In>,
    F: Fn(Option<usize>) -> NodeBuilder<St::Out> + Sync,
{
    type Cursor = C;
    type Output = Node<St::Out>;

    fn make_child(&self) -> Self {
        Self { helper: self.helper, factory: self.factory, cursor: PhantomData }
    }

    fn leaf(&self, _control: &TaskControl, cursor: C) -> Self::Output {
        self.helper.fill_node(cursor, self.factory)
    }

    fn merge(&self, _control: &TaskControl, left: Self::Output, right: Self::Output) -> Self::Output {
        Node::concat(left, right)
    }

    fn splittable(&self) -> bool {
        !self.helper.is_stateful()
    }
}

pub(crate) fn collect<St, C, F>(
    engine: &Engine,
    helper: &PipelineHelper<'_, St>,
    cursor: C,
    factory: &F,
) -> Result<Node<St::Out>>
where
    St: Stage,
    St::Out: Send,
    C: Cursor<Item = St::In>,
    F: Fn(Option<usize>) -> NodeBuilder<St::Out> + Sync,
{
    engine.invoke(CollectTask { helper, factory, cursor: PhantomData }, cursor)
}
