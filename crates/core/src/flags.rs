use bitflags::bitflags;

bitflags! {
    /// Declarative properties known about a source or a combined stage chain.
    ///
    /// Operations consult these to skip redundant work, e.g. duplicate removal on a source
    /// already known to be distinct.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StreamFlags: u8 {
        /// No two elements compare equal.
        const DISTINCT = 1 << 0;
        /// Elements arrive in ascending natural order.
        const SORTED = 1 << 1;
        /// The source defines an encounter order results must respect.
        const ORDERED = 1 << 2;
        /// The element count is known exactly before traversal.
        const SIZED = 1 << 3;
        /// Some stage may stop the traversal before the source is exhausted.
        const SHORT_CIRCUIT = 1 << 4;
    }
}

impl StreamFlags {
    /// Flags of an ordered source whose exact length is known up front.
    pub const SIZED_ORDERED: Self = Self::SIZED.union(Self::ORDERED);
}
