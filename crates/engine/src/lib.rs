//! Parallel execution engine for lazy, multi-stage pipelines.
//!
//! A pipeline is a chain of [`pipeline::Stage`]s over a [`Cursor`]. Terminal operations in
//! [`ops`] evaluate it either sequentially, pushing every element through one sink chain, or in
//! parallel by building a fork/join [`task`] tree on an [`Engine`]'s worker pool. Short-circuiting
//! operations stop the whole tree once an answer is known.

pub mod engine;
pub mod error;
pub mod ops;
pub mod pipeline;
pub mod task;

pub use engine::{Engine, EngineConfig};
pub use error::{Error, Result};
pub use ops::TerminalOp;
pub use ops::distinct::DistinctOp;
pub use ops::find::FindOp;
pub use ops::for_each::ForEachOp;
pub use ops::matching::{MatchKind, MatchOp};
pub use ops::reduce::{ReduceOp, sum};
pub use parastream_core::{
    Cursor, FnSink, IterCursor, RangeCursor, SizeEstimate, Sink, SliceCursor, StreamFlags, VecCursor,
};
pub use pipeline::{Execution, Node, NodeBuilder, PipelineHelper, Source, Stage, StageExt};
pub use task::short_circuit::{ShortCircuitContext, ShortCircuitTask, SharedResult};
pub use task::{TaskControl, TreeTask, suggest_target_size};
