//! Suffix tree nodes and the arena that owns them.
//!
//! Nodes live in a single `Vec` and refer to each other through 32-bit
//! [`NodeId`] offsets instead of boxed pointers. The root is always slot 0.
//! Edges are path compressed: a node does not store the characters leading
//! to it, only the range of the shared symbol buffer that spells them, so a
//! chain of single-child transitions collapses into one node.
//!
//! Transition tables are keyed by the first symbol of each child's label.
//! Most nodes have two or three children, so the inline capacity covers the
//! common case without a heap allocation.

use std::ops::Range;

use smallvec::SmallVec;

/// Index of a candidate in the owning index's sorted candidate table.
pub type CandidateId = u32;

/// One transition unit of the symbol buffer.
///
/// Values up to `char::MAX` are folded characters. Values above it are
/// per-candidate terminators that no query can contain.
pub type Symbol = u32;

/// Offset of a node inside a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The root node. It has no incoming label.
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Inline capacity of a node's transition table.
const INLINE_EDGES: usize = 2;

/// One node of the suffix tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// Incoming label is `symbols[start..end]`. Empty for the root.
    start: u32,
    end: u32,
    /// Outgoing edges keyed by the first symbol of the child's label.
    edges: SmallVec<[(Symbol, NodeId); INLINE_EDGES]>,
    /// Candidate owning the suffix that ends at this leaf.
    payload: Option<CandidateId>,
}

impl Node {
    fn new(start: u32, end: u32) -> Self {
        Self {
            start,
            end,
            edges: SmallVec::new(),
            payload: None,
        }
    }

    /// Range of the symbol buffer spelling the incoming edge.
    #[inline]
    pub fn label(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    /// Start of the incoming label.
    #[inline]
    pub fn label_start(&self) -> usize {
        self.start as usize
    }

    /// Find the child whose label begins with `symbol`.
    #[inline]
    pub fn child(&self, symbol: Symbol) -> Option<NodeId> {
        self.edges
            .iter()
            .find_map(|&(k, id)| (k == symbol).then_some(id))
    }

    /// Outgoing edges in insertion order.
    #[inline]
    pub fn edges(&self) -> &[(Symbol, NodeId)] {
        &self.edges
    }

    /// Candidate whose suffix ends here. Only leaves carry one.
    #[inline]
    pub fn payload(&self) -> Option<CandidateId> {
        self.payload
    }

    /// Whether the node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.edges.is_empty()
    }

    fn heap_bytes(&self) -> usize {
        if self.edges.spilled() {
            self.edges.capacity() * std::mem::size_of::<(Symbol, NodeId)>()
        } else {
            0
        }
    }
}

/// Owner of every node in one tree.
#[derive(Debug, Clone)]
pub struct NodeArena {
    nodes: Vec<Node>,
    edge_count: usize,
    payload_count: usize,
}

impl NodeArena {
    /// Create an arena holding only an empty root.
    pub fn new() -> Self {
        Self::with_capacity(1)
    }

    /// Create an arena with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(1));
        nodes.push(Node::new(0, 0));
        Self {
            nodes,
            edge_count: 0,
            payload_count: 0,
        }
    }

    /// Borrow a node.
    ///
    /// # Panics
    /// If `id` was not produced by this arena.
    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// The root node.
    #[inline]
    pub fn root(&self) -> &Node {
        self.get(NodeId::ROOT)
    }

    /// Number of nodes, root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// An arena always holds at least its root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of parent/child edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Number of nodes carrying a payload.
    pub fn payload_count(&self) -> usize {
        self.payload_count
    }

    /// Allocate a detached node labelled `symbols[start..end]`.
    pub(crate) fn push(&mut self, start: usize, end: u32) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).expect("suffix tree exceeds u32::MAX nodes"));
        self.nodes.push(Node::new(start as u32, end));
        id
    }

    /// Attach `child` under `parent`. `symbol` must not already be a key.
    pub(crate) fn add_edge(&mut self, parent: NodeId, symbol: Symbol, child: NodeId) {
        debug_assert!(self.get(parent).child(symbol).is_none());
        self.nodes[parent.index()].edges.push((symbol, child));
        self.edge_count += 1;
    }

    /// Point the existing `symbol` edge of `parent` at `child`.
    pub(crate) fn replace_edge(&mut self, parent: NodeId, symbol: Symbol, child: NodeId) {
        if let Some(slot) = self.nodes[parent.index()]
            .edges
            .iter_mut()
            .find(|(k, _)| *k == symbol)
        {
            slot.1 = child;
        }
    }

    /// Move the start of a node's label forward after a split.
    pub(crate) fn set_start(&mut self, id: NodeId, start: usize) {
        self.nodes[id.index()].start = start as u32;
    }

    /// Close every label whose end is `open` at `end`.
    pub(crate) fn close_labels(&mut self, open: u32, end: u32) {
        for node in &mut self.nodes {
            if node.end == open {
                node.end = end;
            }
        }
    }

    /// Record the candidate owning the suffix that ends at leaf `id`.
    pub(crate) fn set_payload(&mut self, id: NodeId, candidate: CandidateId) {
        let node = &mut self.nodes[id.index()];
        if node.payload.replace(candidate).is_none() {
            self.payload_count += 1;
        }
    }

    /// Depth-first iterator over `start` and all of its descendants.
    pub fn descendants(&self, start: NodeId) -> Descendants<'_> {
        Descendants {
            arena: self,
            stack: vec![start],
        }
    }

    /// Drop spare capacity left over from building.
    pub fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
    }

    /// Approximate heap usage in bytes.
    pub fn memory_usage(&self) -> usize {
        let slots = self.nodes.capacity() * std::mem::size_of::<Node>();
        let spilled: usize = self.nodes.iter().map(Node::heap_bytes).sum();
        slots + spilled
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`NodeArena::descendants`].
pub struct Descendants<'a> {
    arena: &'a NodeArena,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.arena.get(id);
        self.stack.extend(node.edges.iter().map(|&(_, child)| child));
        Some(node)
    }
}
