//! Push-based element consumers.

/// Receives the elements of one traversal.
///
/// A traversal calls `begin` once, `accept` for every element and `end` once. Sinks chain by
/// wrapping a downstream sink; the outermost sink sits next to the source and the innermost one is
/// the terminal consumer. A sink that no longer needs input reports it through
/// `cancellation_requested`, which cancellation-aware traversals poll between elements.
pub trait Sink<T> {
    /// Starts a traversal; `expected` is the exact element count when known.
    fn begin(&mut self, _expected: Option<usize>) {}

    fn accept(&mut self, item: T);

    fn end(&mut self) {}

    fn cancellation_requested(&self) -> bool {
        false
    }
}

impl<T, S> Sink<T> for &mut S
where
    S: Sink<T> + ?Sized,
{
    fn begin(&mut self, expected: Option<usize>) {
        (**self).begin(expected);
    }

    fn accept(&mut self, item: T) {
        (**self).accept(item);
    }

    fn end(&mut self) {
        (**self).end();
    }

    fn cancellation_requested(&self) -> bool {
        (**self).cancellation_requested()
    }
}

/// Terminal sink forwarding each element to a closure.
#[derive(Debug, Clone)]
pub struct FnSink<F>(F);

impl<T, F> Sink<T> for FnSink<F>
where
    F: FnMut(T),
{
    fn accept(&mut self, item: T) {
        (self.0)(item);
    }
}

pub fn from_fn<T, F>(action: F) -> FnSink<F>
where
    F: FnMut(T),
{
    FnSink(action)
}
