//! Contracts shared by every parastream evaluation: splittable cursors, push-based sinks and the
//! declarative flags a source or stage chain advertises.

pub mod cursor;
pub mod cursors;
pub mod flags;
pub mod sink;

pub use cursor::{Cursor, SizeEstimate};
pub use cursors::{IterCursor, RangeCursor, SliceCursor, VecCursor};
pub use flags::StreamFlags;
pub use sink::{FnSink, Sink, from_fn};
