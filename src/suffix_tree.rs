//! Generalized suffix tree over the folded candidate keys.
//!
//! All keys are laid end to end in one symbol buffer, each followed by a
//! terminator symbol unique to its candidate, the same way a patricia key
//! arena packs every key into one `Vec` and lets nodes hold offsets into it.
//! Edges carry `(start, end)` ranges into that buffer instead of characters,
//! so unary chains never materialize as separate nodes.
//!
//! The tree is built online with Ukkonen's algorithm. Both the construction
//! time and the node count are linear in the buffer length: there is one
//! leaf per suffix of the buffer and every internal node except the root has
//! at least two children, so a buffer of `m` symbols yields at most `2m`
//! nodes.
//!
//! Because the terminators are distinct and never occur in a query, a
//! query's path can't cross from one key into the next. A leaf is labelled
//! with the candidate owning the position its suffix starts at.

use std::time::Instant;

use crate::node::{CandidateId, NodeArena, NodeId, Symbol};
use crate::CaseFolding;

/// First terminator symbol. Everything below is a `char`.
const TERMINATOR_BASE: Symbol = char::MAX as Symbol + 1;

/// Label end of a leaf that is still growing.
const OPEN: u32 = u32::MAX;

/// Longest buffer that still leaves room for [`OPEN`] and the terminators.
const MAX_SYMBOLS: usize = (OPEN - TERMINATOR_BASE) as usize;

#[inline]
fn terminator(id: CandidateId) -> Symbol {
    TERMINATOR_BASE + id
}

/// Path-compressed suffix tree over a fixed list of keys.
#[derive(Debug, Clone)]
pub(crate) struct SuffixTree {
    arena: NodeArena,
    symbols: Box<[Symbol]>,
    /// Offset of each candidate's first symbol, ascending.
    starts: Box<[u32]>,
}

impl SuffixTree {
    /// Build from `keys`, where key `i` belongs to candidate `i`.
    ///
    /// # Panics
    /// If the keys hold more than about four billion characters in total.
    pub fn build<'a, I>(keys: I, folding: CaseFolding) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let started = Instant::now();
        let mut symbols: Vec<Symbol> = Vec::new();
        let mut starts: Vec<u32> = Vec::new();
        for (id, key) in keys.into_iter().enumerate() {
            starts.push(symbols.len() as u32);
            folding.fold_each(key, |c| symbols.push(c as Symbol));
            symbols.push(terminator(id as CandidateId));
            assert!(
                symbols.len() <= MAX_SYMBOLS,
                "candidate keys exceed {MAX_SYMBOLS} symbols"
            );
        }

        let mut builder = Ukkonen::new(&symbols);
        for pos in 0..symbols.len() {
            builder.extend(pos);
        }
        let mut arena = builder.finish();
        arena.close_labels(OPEN, symbols.len() as u32);
        label_leaves(&mut arena, &starts, symbols.len());
        arena.shrink_to_fit();

        tracing::trace!(
            symbols = symbols.len(),
            nodes = arena.len(),
            elapsed_us = (started.elapsed().as_micros() as u64),
            "built suffix tree"
        );
        Self {
            arena,
            symbols: symbols.into_boxed_slice(),
            starts: starts.into_boxed_slice(),
        }
    }

    /// Node at or just below the end of `query`'s path, if the path exists.
    ///
    /// A query ending halfway along an edge resolves to that edge's child;
    /// the child's subtree holds the same leaves.
    pub fn locate(&self, query: &[Symbol]) -> Option<NodeId> {
        let mut at = NodeId::ROOT;
        let mut matched = 0;
        while matched < query.len() {
            let child = self.arena.get(at).child(query[matched])?;
            let label = &self.symbols[self.arena.get(child).label()];
            let rest = &query[matched..];
            let take = label.len().min(rest.len());
            if label[..take] != rest[..take] {
                return None;
            }
            matched += take;
            at = child;
        }
        Some(at)
    }

    /// Sorted, deduplicated candidates owning a leaf below `node`.
    pub fn candidates_below(&self, node: NodeId) -> Vec<CandidateId> {
        let mut ids: Vec<CandidateId> = self
            .arena
            .descendants(node)
            .filter_map(|n| n.payload())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// The node arena.
    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// Length of the shared symbol buffer, terminators included.
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Heap bytes held by the symbol buffer and offset table.
    pub fn buffer_bytes(&self) -> usize {
        (self.symbols.len() + self.starts.len()) * std::mem::size_of::<u32>()
    }

    #[cfg(test)]
    pub(crate) fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    #[cfg(test)]
    pub(crate) fn owner(&self, pos: usize) -> CandidateId {
        owner(&self.starts, pos)
    }
}

/// Candidate whose key or terminator occupies buffer position `pos`.
fn owner(starts: &[u32], pos: usize) -> CandidateId {
    let after = starts.partition_point(|&s| s as usize <= pos);
    (after - 1) as CandidateId
}

/// Online construction state.
struct Ukkonen<'a> {
    symbols: &'a [Symbol],
    arena: NodeArena,
    /// Suffix link of every node, indexed like the arena.
    links: Vec<NodeId>,
    active_node: NodeId,
    /// Buffer position of the first symbol of the active edge.
    active_edge: usize,
    active_len: usize,
    /// Suffixes still waiting to be made explicit.
    remainder: usize,
}

impl<'a> Ukkonen<'a> {
    fn new(symbols: &'a [Symbol]) -> Self {
        let capacity = 2 * symbols.len() + 1;
        let mut links = Vec::with_capacity(capacity);
        links.push(NodeId::ROOT);
        Self {
            symbols,
            arena: NodeArena::with_capacity(capacity),
            links,
            active_node: NodeId::ROOT,
            active_edge: 0,
            active_len: 0,
            remainder: 0,
        }
    }

    fn node(&mut self, start: usize, end: u32) -> NodeId {
        self.links.push(NodeId::ROOT);
        self.arena.push(start, end)
    }

    /// Length of `id`'s label as of phase `pos`.
    fn edge_len(&self, id: NodeId, pos: usize) -> usize {
        let label = self.arena.get(id).label();
        label.end.min(pos + 1) - label.start
    }

    /// Record `node` as the suffix link target of the previously split node.
    fn link(&mut self, pending: &mut Option<NodeId>, node: NodeId) {
        if let Some(from) = pending.replace(node) {
            self.links[from.index()] = node;
        }
    }

    /// Phase `pos`: make every suffix ending at `pos` present in the tree.
    fn extend(&mut self, pos: usize) {
        let symbol = self.symbols[pos];
        let mut pending: Option<NodeId> = None;
        self.remainder += 1;

        while self.remainder > 0 {
            if self.active_len == 0 {
                self.active_edge = pos;
            }
            let edge_symbol = self.symbols[self.active_edge];

            match self.arena.get(self.active_node).child(edge_symbol) {
                None => {
                    let leaf = self.node(pos, OPEN);
                    self.arena.add_edge(self.active_node, edge_symbol, leaf);
                    let active = self.active_node;
                    self.link(&mut pending, active);
                }
                Some(next) => {
                    let len = self.edge_len(next, pos);
                    if self.active_len >= len {
                        self.active_edge += len;
                        self.active_len -= len;
                        self.active_node = next;
                        continue;
                    }

                    let next_start = self.arena.get(next).label_start();
                    if self.symbols[next_start + self.active_len] == symbol {
                        self.active_len += 1;
                        let active = self.active_node;
                        self.link(&mut pending, active);
                        break;
                    }

                    let split_end = (next_start + self.active_len) as u32;
                    let split = self.node(next_start, split_end);
                    self.arena.replace_edge(self.active_node, edge_symbol, split);
                    let leaf = self.node(pos, OPEN);
                    self.arena.add_edge(split, symbol, leaf);
                    self.arena.set_start(next, split_end as usize);
                    self.arena.add_edge(split, self.symbols[split_end as usize], next);
                    self.link(&mut pending, split);
                }
            }

            self.remainder -= 1;
            if self.active_node == NodeId::ROOT && self.active_len > 0 {
                self.active_len -= 1;
                self.active_edge = pos + 1 - self.remainder;
            } else {
                self.active_node = self.links[self.active_node.index()];
            }
        }
    }

    fn finish(self) -> NodeArena {
        self.arena
    }
}

/// Give every leaf the candidate its suffix starts in.
fn label_leaves(arena: &mut NodeArena, starts: &[u32], total: usize) {
    let mut stack = vec![(NodeId::ROOT, 0usize)];
    let mut leaves = Vec::new();
    while let Some((id, depth)) = stack.pop() {
        let node = arena.get(id);
        let depth = depth + node.label().len();
        if id != NodeId::ROOT && node.is_leaf() {
            leaves.push((id, total - depth));
            continue;
        }
        stack.extend(node.edges().iter().map(|&(_, child)| (child, depth)));
    }
    for (leaf, suffix_start) in leaves {
        arena.set_payload(leaf, owner(starts, suffix_start));
    }
}
