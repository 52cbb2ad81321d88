//! Task trees that stop as soon as an answer is known.
//!
//! All tasks of one tree share a write-once [`SharedResult`]. A leaf that finds the answer declares
//! it; every other task notices the filled slot before its next split or leaf and gives up.
//! Order-sensitive operations use cancellation instead: a task that finds a candidate cancels the
//! tasks that come after it and keeps its result locally.

use std::sync::Arc;

use once_cell::race::OnceBox;
use parastream_core::Cursor;
use tracing::trace;

use super::{TaskControl, TreeTask};
use crate::engine::Engine;
use crate::error::Result;

/// Write-once answer slot shared by all tasks of one tree.
pub struct SharedResult<V> {
    slot: OnceBox<V>,
}

impl<V> SharedResult<V> {
    pub fn new() -> Self {
        Self { slot: OnceBox::new() }
    }

    /// Stores `value` unless a value is already present; returns whether this call stored it.
    pub fn declare(&self, value: V) -> bool {
        self.slot.set(Box::new(value)).is_ok()
    }

    pub fn get(&self) -> Option<&V> {
        self.slot.get()
    }

    pub fn is_set(&self) -> bool {
        self.slot.get().is_some()
    }
}

impl<V> Default for SharedResult<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// What a short-circuit task sees of its tree while evaluating a leaf or a merge.
pub struct ShortCircuitContext<'t, V> {
    control: &'t TaskControl,
    shared: &'t SharedResult<V>,
}

impl<'t, V> ShortCircuitContext<'t, V> {
    pub fn new(control: &'t TaskControl, shared: &'t SharedResult<V>) -> Self {
        Self { control, shared }
    }

    /// Publishes the tree-wide answer; only the first declaration wins.
    pub fn declare(&self, value: V) -> bool {
        let won = self.shared.declare(value);
        if won {
            trace!(depth = self.control.depth(), "result declared");
        }
        won
    }

    /// The answer is known or this task has been cancelled.
    pub fn is_finished(&self) -> bool {
        self.shared.is_set() || self.control.is_cancelled()
    }

    pub fn is_cancelled(&self) -> bool {
        self.control.is_cancelled()
    }

    pub fn is_leftmost(&self) -> bool {
        self.control.is_leftmost()
    }

    pub fn cancel_later_nodes(&self) {
        self.control.cancel_later_nodes();
    }

    pub fn control(&self) -> &'t TaskControl {
        self.control
    }
}

/// Leaf and merge logic of a short-circuiting operation.
///
/// A task returns `None` when it contributes nothing, either because it found nothing or because
/// it declared its answer through the context.
pub trait ShortCircuitTask: Send + Sync + Sized {
    type Cursor: Cursor;
    type Value: Clone + Send + Sync;

    fn make_child(&self) -> Self;

    fn leaf(&self, context: &ShortCircuitContext<'_, Self::Value>, cursor: Self::Cursor) -> Option<Self::Value>;

    fn merge(
        &self,
        _context: &ShortCircuitContext<'_, Self::Value>,
        left: Option<Self::Value>,
        right: Option<Self::Value>,
    ) -> Option<Self::Value> {
        left.or(right)
    }

    /// The answer when nothing was declared or found.
    fn empty_result(&self) -> Self::Value;

    fn splittable(&self) -> bool {
        true
    }
}

struct ShortCircuit<T: ShortCircuitTask> {
    inner: T,
    shared: Arc<SharedResult<T::Value>>,
}

impl<T: ShortCircuitTask> TreeTask for ShortCircuit<T> {
    type Cursor = T::Cursor;
    type Output = Option<T::Value>;

    fn make_child(&self) -> Self {
        Self { inner: self.inner.make_child(), shared: Arc::clone(&self.shared) }
    }

    fn leaf(&self, control: &TaskControl, cursor: Self::Cursor) -> Self::Output {
        self.inner.leaf(&ShortCircuitContext::new(control, &self.shared), cursor)
    }

    fn merge(&self, control: &TaskControl, left: Self::Output, right: Self::Output) -> Self::Output {
        self.inner.merge(&ShortCircuitContext::new(control, &self.shared), left, right)
    }

    fn abandon(&self, control: &TaskControl) -> Option<Self::Output> {
        (self.shared.is_set() || control.is_cancelled()).then_some(None)
    }

    fn splittable(&self) -> bool {
        self.inner.splittable()
    }
}

/// Runs a short-circuit task tree and returns the declared answer, the root's own result, or the
/// task's empty result, in that order of preference.
pub fn invoke<T: ShortCircuitTask>(engine: &Engine, task: T, cursor: T::Cursor) -> Result<T::Value> {
    let shared = Arc::new(SharedResult::new());
    let empty = task.empty_result();
    let root = ShortCircuit { inner: task, shared: Arc::clone(&shared) };
    if let Some(local) = engine.invoke(root, cursor)? {
        shared.declare(local);
    }
    Ok(shared.get().cloned().unwrap_or(empty))
}
