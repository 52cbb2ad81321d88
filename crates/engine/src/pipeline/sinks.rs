//! Chain nodes inserted by the built-in stages.

use parastream_core::Sink;

pub struct FilterSink<'s, P, S> {
    predicate: &'s P,
    downstream: S,
}

impl<'s, P, S> FilterSink<'s, P, S> {
    pub fn new(predicate: &'s P, downstream: S) -> Self {
        Self { predicate, downstream }
    }
}

impl<T, P, S> Sink<T> for FilterSink<'_, P, S>
where
    P: Fn(&T) -> bool,
    S: Sink<T>,
{
    fn begin(&mut self, _expected: Option<usize>) {
        self.downstream.begin(None);
    }

    fn accept(&mut self, item: T) {
        if (self.predicate)(&item) {
            self.downstream.accept(item);
        }
    }

    fn end(&mut self) {
        self.downstream.end();
    }

    fn cancellation_requested(&self) -> bool {
        self.downstream.cancellation_requested()
    }
}

pub struct MapSink<'s, F, S> {
    mapper: &'s F,
    downstream: S,
}

impl<'s, F, S> MapSink<'s, F, S> {
    pub fn new(mapper: &'s F, downstream: S) -> Self {
        Self { mapper, downstream }
    }
}

impl<T, R, F, S> Sink<T> for MapSink<'_, F, S>
where
    F: Fn(T) -> R,
    S: Sink<R>,
{
    fn begin(&mut self, expected: Option<usize>) {
        self.downstream.begin(expected);
    }

    fn accept(&mut self, item: T) {
        self.downstream.accept((self.mapper)(item));
    }

    fn end(&mut self) {
        self.downstream.end();
    }

    fn cancellation_requested(&self) -> bool {
        self.downstream.cancellation_requested()
    }
}

pub struct InspectSink<'s, F, S> {
    action: &'s F,
    downstream: S,
}

impl<'s, F, S> InspectSink<'s, F, S> {
    pub fn new(action: &'s F, downstream: S) -> Self {
        Self { action, downstream }
    }
}

impl<T, F, S> Sink<T> for InspectSink<'_, F, S>
where
    F: Fn(&T),
    S: Sink<T>,
{
    fn begin(&mut self, expected: Option<usize>) {
        self.downstream.begin(expected);
    }

    fn accept(&mut self, item: T) {
        (self.action)(&item);
        self.downstream.accept(item);
    }

    fn end(&mut self) {
        self.downstream.end();
    }

    fn cancellation_requested(&self) -> bool {
        self.downstream.cancellation_requested()
    }
}

/// Buffers every element and pushes them downstream in ascending order once the input ends.
///
/// Downstream `begin` is deferred to the flush, where the exact count is known.
pub struct SortedSink<T, S> {
    buffer: Vec<T>,
    downstream: S,
}

impl<T, S> SortedSink<T, S> {
    pub fn new(downstream: S) -> Self {
        Self { buffer: Vec::new(), downstream }
    }
}

impl<T, S> Sink<T> for SortedSink<T, S>
where
    T: Ord,
    S: Sink<T>,
{
    fn begin(&mut self, expected: Option<usize>) {
        self.buffer.clear();
        if let Some(expected) = expected {
            self.buffer.reserve(expected);
        }
    }

    fn accept(&mut self, item: T) {
        self.buffer.push(item);
    }

    fn end(&mut self) {
        self.buffer.sort();
        self.downstream.begin(Some(self.buffer.len()));
        for item in self.buffer.drain(..) {
            if self.downstream.cancellation_requested() {
                break;
            }
            self.downstream.accept(item);
        }
        self.downstream.end();
    }
}

/// Passes elements through until the first one failing the predicate, then asks for cancellation.
pub struct TakeWhileSink<'s, P, S> {
    predicate: &'s P,
    taking: bool,
    downstream: S,
}

impl<'s, P, S> TakeWhileSink<'s, P, S> {
    pub fn new(predicate: &'s P, downstream: S) -> Self {
        Self { predicate, taking: true, downstream }
    }
}

impl<T, P, S> Sink<T> for TakeWhileSink<'_, P, S>
where
    P: Fn(&T) -> bool,
    S: Sink<T>,
{
    fn begin(&mut self, _expected: Option<usize>) {
        self.taking = true;
        self.downstream.begin(None);
    }

    fn accept(&mut self, item: T) {
        if self.taking && (self.predicate)(&item) {
            self.downstream.accept(item);
        } else {
            self.taking = false;
        }
    }

    fn end(&mut self) {
        self.downstream.end();
    }

    fn cancellation_requested(&self) -> bool {
        !self.taking || self.downstream.cancellation_requested()
    }
}
