//! Terminal operations.
//!
//! Each operation evaluates a pipeline either by driving one sink chain over the whole cursor or
//! by running a task tree whose leaves drive a chain over their part of the cursor.

pub(crate) mod collect;
pub mod distinct;
pub mod find;
pub mod for_each;
pub mod matching;
pub mod reduce;

use parastream_core::Cursor;
use tracing::debug;

use crate::engine::Engine;
use crate::error::Result;
use crate::pipeline::{Execution, PipelineHelper, Stage};

/// The last operation of a pipeline, producing a result instead of a stream.
pub trait TerminalOp<St: Stage> {
    type Output;

    fn evaluate_sequential<C>(&self, helper: &PipelineHelper<'_, St>, cursor: C) -> Self::Output
    where
        C: Cursor<Item = St::In>;

    fn evaluate_parallel<C>(&self, engine: &Engine, helper: &PipelineHelper<'_, St>, cursor: C) -> Result<Self::Output>
    where
        C: Cursor<Item = St::In>;

    /// Evaluates in the mode the helper was created with.
    fn evaluate<C>(&self, helper: &PipelineHelper<'_, St>, cursor: C) -> Result<Self::Output>
    where
        C: Cursor<Item = St::In>,
    {
        match helper.execution() {
            Execution::Sequential => Ok(self.evaluate_sequential(helper, cursor)),
            Execution::Parallel(engine) => {
                if helper.is_stateful() {
                    debug!("stateful stage chain, evaluating as a single leaf");
                }
                self.evaluate_parallel(engine, helper, cursor)
            }
        }
    }
}
