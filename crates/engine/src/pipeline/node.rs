use parastream_core::Sink;

/// Materialized pipeline output.
///
/// Parallel collection produces one leaf per task and concatenates them while merging, so the
/// tree mirrors the task tree and copying happens at most once, in `flatten`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<T> {
    Leaf(Vec<T>),
    Concat { left: Box<Node<T>>, right: Box<Node<T>>, len: usize },
}

impl<T> Node<T> {
    pub fn empty() -> Self {
        Node::Leaf(Vec::new())
    }

    /// `left` followed by `right`; an empty side is dropped.
    pub fn concat(left: Self, right: Self) -> Self {
        if left.is_empty() {
            right
        } else if right.is_empty() {
            left
        } else {
            let len = left.len() + right.len();
            Node::Concat { left: Box::new(left), right: Box::new(right), len }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Node::Leaf(items) => items.len(),
            Node::Concat { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn flatten(self) -> Self {
        match self {
            Node::Leaf(_) => self,
            Node::Concat { .. } => Node::Leaf(self.into_vec()),
        }
    }

    /// Elements in encounter order.
    pub fn into_vec(self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            match node {
                Node::Leaf(items) => out.extend(items),
                Node::Concat { left, right, .. } => {
                    pending.push(*right);
                    pending.push(*left);
                }
            }
        }
        out
    }
}

impl<T> From<Vec<T>> for Node<T> {
    fn from(items: Vec<T>) -> Self {
        Node::Leaf(items)
    }
}

/// Sink that materializes a traversal into a [`Node::Leaf`].
#[derive(Debug)]
pub enum NodeBuilder<T> {
    /// Expects exactly `capacity` elements.
    Fixed { items: Vec<T>, capacity: usize },
    Growable(Vec<T>),
}

impl<T> NodeBuilder<T> {
    pub fn fixed(capacity: usize) -> Self {
        NodeBuilder::Fixed { items: Vec::with_capacity(capacity), capacity }
    }

    pub fn growable() -> Self {
        NodeBuilder::Growable(Vec::new())
    }

    /// A fixed builder when the exact output size is known, a growable one otherwise.
    pub fn for_size(exact: Option<usize>) -> Self {
        exact.map_or_else(Self::growable, Self::fixed)
    }

    pub fn build(self) -> Node<T> {
        match self {
            NodeBuilder::Fixed { items, capacity } => {
                assert_eq!(items.len(), capacity, "fixed node builder not filled");
                Node::Leaf(items)
            }
            NodeBuilder::Growable(items) => Node::Leaf(items),
        }
    }
}

impl<T> Sink<T> for NodeBuilder<T> {
    fn begin(&mut self, expected: Option<usize>) {
        match self {
            NodeBuilder::Fixed { items, capacity } => {
                assert_eq!(expected, Some(*capacity), "fixed node builder sized for a different count");
                items.clear();
            }
            NodeBuilder::Growable(items) => {
                items.clear();
                if let Some(expected) = expected {
                    items.reserve(expected);
                }
            }
        }
    }

    fn accept(&mut self, item: T) {
        match self {
            NodeBuilder::Fixed { items, capacity } => {
                assert!(items.len() < *capacity, "fixed node builder overflow");
                items.push(item);
            }
            NodeBuilder::Growable(items) => items.push(item),
        }
    }
}
