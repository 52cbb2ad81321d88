//! Fork/join task trees.
//!
//! A tree starts with one root task over the whole cursor. A task keeps splitting its cursor while
//! the estimate exceeds the tree's target leaf size, forking one half onto the pool and continuing
//! with the other. Unsplit cursors are evaluated as leaves. Results travel back up: each parent
//! counts its outstanding children and the child that completes last merges both results, left
//! before right, and carries on towards the root.

pub mod short_circuit;

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use parastream_core::{Cursor, SizeEstimate};
use tracing::trace;

use crate::error::{Error, Result};

/// Leaves per worker aimed for when no factor is configured.
pub const LEAF_TARGET_FACTOR: usize = 4;

/// Target leaf size for a tree of `estimate` elements on a pool with `parallelism` workers.
pub fn suggest_target_size(estimate: SizeEstimate, parallelism: usize) -> usize {
    target_size_for(estimate, parallelism.saturating_mul(LEAF_TARGET_FACTOR))
}

pub(crate) fn target_size_for(estimate: SizeEstimate, leaves: usize) -> usize {
    (estimate.upper_bound() / leaves.max(1)).max(1)
}

/// Position of a task relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Root,
    Left,
    Right,
}

/// Tree links and the cancellation marker of one task, independent of the result type.
#[derive(Debug)]
pub struct TaskControl {
    side: Side,
    depth: usize,
    parent: Option<Arc<TaskControl>>,
    // set on left children only
    right_sibling: Option<Arc<TaskControl>>,
    cancelled: AtomicBool,
}

impl TaskControl {
    pub fn root() -> Self {
        Self { side: Side::Root, depth: 0, parent: None, right_sibling: None, cancelled: AtomicBool::new(false) }
    }

    /// Control blocks for the two children of `parent`, left first.
    pub fn split(parent: &Arc<Self>) -> (Arc<Self>, Arc<Self>) {
        let right = Arc::new(Self::child(parent, Side::Right, None));
        let left = Arc::new(Self::child(parent, Side::Left, Some(Arc::clone(&right))));
        (left, right)
    }

    fn child(parent: &Arc<Self>, side: Side, right_sibling: Option<Arc<Self>>) -> Self {
        Self {
            side,
            depth: parent.depth + 1,
            parent: Some(Arc::clone(parent)),
            right_sibling,
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Marks this task cancelled; returns `true` only for the call that set the marker.
    pub fn cancel(&self) -> bool {
        let won = self.cancelled.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok();
        if won {
            trace!(depth = self.depth, side = ?self.side, "task cancelled");
        }
        won
    }

    /// Whether this task or any ancestor has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.ancestors().any(|node| node.cancelled.load(Ordering::Acquire))
    }

    /// Whether every step from the root down to this task took the left branch.
    pub fn is_leftmost(&self) -> bool {
        self.ancestors().all(|node| matches!(node.side, Side::Left | Side::Root))
    }

    /// Cancels every task that comes after this one in encounter order.
    ///
    /// Walking towards the root, whenever the current node is a left child its right sibling is
    /// cancelled; cancellation of a subtree covers all of its descendants.
    pub fn cancel_later_nodes(&self) {
        for node in self.ancestors() {
            if let Some(sibling) = &node.right_sibling {
                sibling.cancel();
            }
        }
    }

    fn ancestors(&self) -> impl Iterator<Item = &TaskControl> {
        std::iter::successors(Some(self), |node| node.parent.as_deref())
    }
}

/// Leaf and merge logic of one parallel operation.
///
/// Every task in a tree is built from its parent through `make_child`, so per-operation state that
/// must not be shared is recreated for each node.
pub trait TreeTask: Send + Sync + Sized {
    type Cursor: Cursor;
    type Output: Send;

    fn make_child(&self) -> Self;

    /// Evaluates a cursor that will not be split any further.
    fn leaf(&self, control: &TaskControl, cursor: Self::Cursor) -> Self::Output;

    /// Combines the results of the left and right child.
    fn merge(&self, control: &TaskControl, left: Self::Output, right: Self::Output) -> Self::Output;

    /// Checked before every split decision; `Some` ends the task with that result.
    fn abandon(&self, _control: &TaskControl) -> Option<Self::Output> {
        None
    }

    /// `false` evaluates the whole cursor as a single leaf.
    fn splittable(&self) -> bool {
        true
    }
}

struct TaskNode<T: TreeTask> {
    task: T,
    control: Arc<TaskControl>,
    completer: Weak<TaskNode<T>>,
    pending: AtomicUsize,
    children: Mutex<Option<(Arc<TaskNode<T>>, Arc<TaskNode<T>>)>>,
    result: Mutex<Option<T::Output>>,
}

impl<T: TreeTask> TaskNode<T> {
    fn new(task: T, control: Arc<TaskControl>, completer: Weak<Self>) -> Self {
        Self {
            task,
            control,
            completer,
            pending: AtomicUsize::new(0),
            children: Mutex::new(None),
            result: Mutex::new(None),
        }
    }

    fn compute<'s>(self: Arc<Self>, scope: &rayon::Scope<'s>, mut cursor: T::Cursor, target: usize)
    where
        T: 's,
        T::Cursor: 's,
    {
        let mut node = self;
        let mut fork_right = false;
        loop {
            if let Some(output) = node.task.abandon(&node.control) {
                node.set_result(output);
                Self::try_complete(node);
                return;
            }

            let estimate = cursor.estimate_size();
            let prefix =
                if node.task.splittable() && estimate.upper_bound() > target { cursor.try_split() } else { None };
            let Some(prefix) = prefix else {
                trace!(depth = node.control.depth, ?estimate, "evaluating leaf");
                let output = node.task.leaf(&node.control, cursor);
                node.set_result(output);
                Self::try_complete(node);
                return;
            };

            let (left_control, right_control) = TaskControl::split(&node.control);
            let left = Arc::new(Self::new(node.task.make_child(), left_control, Arc::downgrade(&node)));
            let right = Arc::new(Self::new(node.task.make_child(), right_control, Arc::downgrade(&node)));
            node.pending.store(1, Ordering::Release);
            *lock(&node.children) = Some((Arc::clone(&left), Arc::clone(&right)));

            let (kept, kept_cursor, forked, forked_cursor) =
                if fork_right { (left, prefix, right, cursor) } else { (right, cursor, left, prefix) };
            trace!(depth = node.control.depth, forked = ?forked.control.side, ?estimate, "split");
            fork_right = !fork_right;
            scope.spawn(move |scope| forked.compute(scope, forked_cursor, target));
            node = kept;
            cursor = kept_cursor;
        }
    }

    fn set_result(&self, output: T::Output) {
        let mut slot = lock(&self.result);
        assert!(slot.is_none(), "task result stored twice");
        *slot = Some(output);
    }

    fn take_result(&self) -> Option<T::Output> {
        lock(&self.result).take()
    }

    /// Signals that `node` holds its result and merges every ancestor whose children are now all
    /// complete.
    fn try_complete(mut node: Arc<Self>) {
        loop {
            let Some(parent) = node.completer.upgrade() else {
                return;
            };
            drop(node);
            let outstanding = parent.pending.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
            if outstanding.is_ok() {
                return;
            }
            parent.on_completion();
            node = parent;
        }
    }

    fn on_completion(&self) {
        let Some((left, right)) = lock(&self.children).take() else {
            return;
        };
        let (Some(left), Some(right)) = (left.take_result(), right.take_result()) else {
            panic!("child task completed without a result");
        };
        let merged = self.task.merge(&self.control, left, right);
        self.set_result(merged);
    }
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Evaluates `task` over `cursor` on `pool` and returns the root's result.
pub(crate) fn run<T: TreeTask>(
    pool: &rayon::ThreadPool,
    task: T,
    cursor: T::Cursor,
    target: usize,
) -> Result<T::Output> {
    let root = Arc::new(TaskNode::new(task, Arc::new(TaskControl::root()), Weak::new()));
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let node = Arc::clone(&root);
        pool.scope(move |scope| node.compute(scope, cursor, target));
    }));
    if let Err(payload) = outcome {
        return Err(Error::from_panic(payload));
    }
    root.take_result().ok_or(Error::Incomplete)
}
