//! Cursors over in-memory sources.

mod iter;
mod range;
mod slice;
mod vec;

pub use iter::IterCursor;
pub use range::RangeCursor;
pub use slice::SliceCursor;
pub use vec::VecCursor;
