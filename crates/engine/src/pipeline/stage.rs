use std::marker::PhantomData;

use parastream_core::{Sink, StreamFlags};

use super::sinks::{FilterSink, InspectSink, MapSink, SortedSink, TakeWhileSink};

/// A chain of intermediate operations from a source element type to an output element type.
///
/// Every stage owns its upstream, so the outermost value describes the whole chain. Wrapping a
/// terminal sink walks from the last stage back to the source, each stage putting its own chain
/// node in front of the sink built so far.
pub trait Stage: Send + Sync {
    /// Element type produced by the source.
    type In;
    /// Element type handed to the terminal sink.
    type Out;

    /// Sink chain accepting source elements and feeding `S`.
    type Chain<'s, S>: Sink<Self::In>
    where
        Self: 's,
        S: Sink<Self::Out> + 's;

    fn wrap_sink<'s, S>(&'s self, downstream: S) -> Self::Chain<'s, S>
    where
        S: Sink<Self::Out> + 's;

    /// Flags of the chain's output given the flags of its source.
    fn flags(&self, source: StreamFlags) -> StreamFlags;

    /// Whether some stage must see all of its input before emitting anything.
    fn is_stateful(&self) -> bool;
}

/// The empty chain.
pub struct Source<T>(PhantomData<fn() -> T>);

impl<T> Source<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for Source<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Stage for Source<T> {
    type In = T;
    type Out = T;
    type Chain<'s, S>
        = S
    where
        Self: 's,
        S: Sink<T> + 's;

    fn wrap_sink<'s, S>(&'s self, downstream: S) -> S
    where
        S: Sink<T> + 's,
    {
        downstream
    }

    fn flags(&self, source: StreamFlags) -> StreamFlags {
        source
    }

    fn is_stateful(&self) -> bool {
        false
    }
}

pub struct Filter<Up, P> {
    upstream: Up,
    predicate: P,
}

impl<Up, P> Stage for Filter<Up, P>
where
    Up: Stage,
    P: Fn(&Up::Out) -> bool + Send + Sync,
{
    type In = Up::In;
    type Out = Up::Out;
    type Chain<'s, S>
        = Up::Chain<'s, FilterSink<'s, P, S>>
    where
        Self: 's,
        S: Sink<Up::Out> + 's;

    fn wrap_sink<'s, S>(&'s self, downstream: S) -> Self::Chain<'s, S>
    where
        S: Sink<Up::Out> + 's,
    {
        self.upstream.wrap_sink(FilterSink::new(&self.predicate, downstream))
    }

    fn flags(&self, source: StreamFlags) -> StreamFlags {
        self.upstream.flags(source).difference(StreamFlags::SIZED)
    }

    fn is_stateful(&self) -> bool {
        self.upstream.is_stateful()
    }
}

pub struct Map<Up, F> {
    upstream: Up,
    mapper: F,
}

impl<Up, F, R> Stage for Map<Up, F>
where
    Up: Stage,
    F: Fn(Up::Out) -> R + Send + Sync,
{
    type In = Up::In;
    type Out = R;
    type Chain<'s, S>
        = Up::Chain<'s, MapSink<'s, F, S>>
    where
        Self: 's,
        S: Sink<R> + 's;

    fn wrap_sink<'s, S>(&'s self, downstream: S) -> Self::Chain<'s, S>
    where
        S: Sink<R> + 's,
    {
        self.upstream.wrap_sink(MapSink::new(&self.mapper, downstream))
    }

    fn flags(&self, source: StreamFlags) -> StreamFlags {
        self.upstream.flags(source).difference(StreamFlags::DISTINCT | StreamFlags::SORTED)
    }

    fn is_stateful(&self) -> bool {
        self.upstream.is_stateful()
    }
}

pub struct Inspect<Up, F> {
    upstream: Up,
    action: F,
}

impl<Up, F> Stage for Inspect<Up, F>
where
    Up: Stage,
    F: Fn(&Up::Out) + Send + Sync,
{
    type In = Up::In;
    type Out = Up::Out;
    type Chain<'s, S>
        = Up::Chain<'s, InspectSink<'s, F, S>>
    where
        Self: 's,
        S: Sink<Up::Out> + 's;

    fn wrap_sink<'s, S>(&'s self, downstream: S) -> Self::Chain<'s, S>
    where
        S: Sink<Up::Out> + 's,
    {
        self.upstream.wrap_sink(InspectSink::new(&self.action, downstream))
    }

    fn flags(&self, source: StreamFlags) -> StreamFlags {
        self.upstream.flags(source)
    }

    fn is_stateful(&self) -> bool {
        self.upstream.is_stateful()
    }
}

pub struct Sorted<Up> {
    upstream: Up,
}

impl<Up> Stage for Sorted<Up>
where
    Up: Stage,
    Up::Out: Ord,
{
    type In = Up::In;
    type Out = Up::Out;
    type Chain<'s, S>
        = Up::Chain<'s, SortedSink<Up::Out, S>>
    where
        Self: 's,
        S: Sink<Up::Out> + 's;

    fn wrap_sink<'s, S>(&'s self, downstream: S) -> Self::Chain<'s, S>
    where
        S: Sink<Up::Out> + 's,
    {
        self.upstream.wrap_sink(SortedSink::new(downstream))
    }

    fn flags(&self, source: StreamFlags) -> StreamFlags {
        self.upstream.flags(source) | StreamFlags::SORTED | StreamFlags::ORDERED
    }

    fn is_stateful(&self) -> bool {
        true
    }
}

/// Keeps the longest prefix matching a predicate.
///
/// The prefix is only known once everything before an element has been seen, so the stage is
/// stateful and parallel evaluation runs it as a single leaf.
pub struct TakeWhile<Up, P> {
    upstream: Up,
    predicate: P,
}

impl<Up, P> Stage for TakeWhile<Up, P>
where
    Up: Stage,
    P: Fn(&Up::Out) -> bool + Send + Sync,
{
    type In = Up::In;
    type Out = Up::Out;
    type Chain<'s, S>
        = Up::Chain<'s, TakeWhileSink<'s, P, S>>
    where
        Self: 's,
        S: Sink<Up::Out> + 's;

    fn wrap_sink<'s, S>(&'s self, downstream: S) -> Self::Chain<'s, S>
    where
        S: Sink<Up::Out> + 's,
    {
        self.upstream.wrap_sink(TakeWhileSink::new(&self.predicate, downstream))
    }

    fn flags(&self, source: StreamFlags) -> StreamFlags {
        self.upstream.flags(source).difference(StreamFlags::SIZED) | StreamFlags::SHORT_CIRCUIT
    }

    fn is_stateful(&self) -> bool {
        true
    }
}

/// Combinators appending a stage to a chain.
pub trait StageExt: Stage + Sized {
    fn filter<P>(self, predicate: P) -> Filter<Self, P>
    where
        P: Fn(&Self::Out) -> bool + Send + Sync,
    {
        Filter { upstream: self, predicate }
    }

    fn map<F, R>(self, mapper: F) -> Map<Self, F>
    where
        F: Fn(Self::Out) -> R + Send + Sync,
    {
        Map { upstream: self, mapper }
    }

    fn inspect<F>(self, action: F) -> Inspect<Self, F>
    where
        F: Fn(&Self::Out) + Send + Sync,
    {
        Inspect { upstream: self, action }
    }

    fn sorted(self) -> Sorted<Self>
    where
        Self::Out: Ord,
    {
        Sorted { upstream: self }
    }

    fn take_while<P>(self, predicate: P) -> TakeWhile<Self, P>
    where
        P: Fn(&Self::Out) -> bool + Send + Sync,
    {
        TakeWhile { upstream: self, predicate }
    }
}

impl<St: Stage> StageExt for St {}

#[cfg(test)]
mod tests {
    use super::*;
    use parastream_core::sink::from_fn;
    use rstest::rstest;

    fn push_all<St: Stage<In = i32>>(stages: &St, input: &[i32]) -> Vec<St::Out> {
        let mut out = Vec::new();
        {
            let mut chain = stages.wrap_sink(from_fn(|x: St::Out| out.push(x)));
            chain.begin(Some(input.len()));
            for &x in input {
                chain.accept(x);
            }
            chain.end();
        }
        out
    }

    #[rstest]
    fn stages_apply_in_declaration_order() {
        let stages = Source::<i32>::new().filter(|x| x % 2 == 1).map(|x| x * 10).filter(|x| *x > 10);
        assert_eq!(push_all(&stages, &[1, 2, 3, 4, 5]), vec![30, 50]);
    }

    #[rstest]
    fn sorted_in_the_middle_of_a_chain() {
        let stages = Source::<i32>::new().map(|x| -x).sorted().map(|x| x.to_string());
        assert_eq!(push_all(&stages, &[2, 9, 4]), vec!["-9", "-4", "-2"]);
        assert!(stages.is_stateful());
    }

    #[rstest]
    #[case(StreamFlags::SIZED_ORDERED | StreamFlags::DISTINCT, StreamFlags::ORDERED)]
    #[case(StreamFlags::SIZED | StreamFlags::SORTED, StreamFlags::empty())]
    #[case(StreamFlags::ORDERED | StreamFlags::SHORT_CIRCUIT, StreamFlags::ORDERED | StreamFlags::SHORT_CIRCUIT)]
    fn filter_then_map_flags(#[case] source: StreamFlags, #[case] expected: StreamFlags) {
        let stages = Source::<i32>::new().filter(|_| true).map(|x| x + 1).filter(|_| true);
        assert_eq!(stages.flags(source), expected);
        assert!(!stages.is_stateful());
    }

    #[rstest]
    fn sorted_and_take_while_flags() {
        let sorted = Source::<i32>::new().sorted();
        assert_eq!(sorted.flags(StreamFlags::SIZED), StreamFlags::SIZED | StreamFlags::SORTED | StreamFlags::ORDERED);

        let prefix = Source::<i32>::new().take_while(|x| *x < 3);
        let flags = prefix.flags(StreamFlags::SIZED_ORDERED);
        assert!(flags.contains(StreamFlags::SHORT_CIRCUIT | StreamFlags::ORDERED));
        assert!(!flags.contains(StreamFlags::SIZED));
        assert_eq!(push_all(&prefix, &[1, 2, 3, 1]), vec![1, 2]);
    }
}
