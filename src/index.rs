//! Substring index over a candidate set.
//!
//! The folded form of every distinct candidate goes into one generalized
//! suffix tree. A query `q` has a path from the
//! root iff some candidate contains `q`, and the leaves below the end of that
//! path are labelled with exactly the candidates containing it.
//!
//! Candidates are kept in a table sorted by their original value, and leaf
//! labels are offsets into that table. Sorting matches by id is the same as
//! sorting them by string, so the query path never compares strings.

use std::fmt;
use std::time::Instant;

use crate::node::{CandidateId, Symbol};
use crate::suffix_tree::SuffixTree;
use crate::{CaseFolding, Config};

/// Memory and shape statistics for an [`Index`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexStats {
    /// Number of distinct candidates.
    pub candidates: usize,
    /// Length of the shared key buffer: every folded character plus one
    /// terminator per candidate.
    pub symbols: usize,
    /// Number of tree nodes, root included. At most `2 * symbols + 1`.
    pub nodes: usize,
    /// Number of parent/child edges.
    pub edges: usize,
    /// Leaves labelled with a candidate, one per buffer position.
    pub payload_entries: usize,
    /// Bytes used by the candidate table.
    pub candidate_bytes: usize,
    /// Bytes used by node structures and the key buffer.
    pub node_bytes: usize,
    /// Bytes per candidate (calculated)
    pub bytes_per_candidate: f64,
}

/// Accumulates candidates before the tree is built.
///
/// ```rust
/// use subtrie::IndexBuilder;
///
/// let mut builder = IndexBuilder::new();
/// builder.push("Kings");
/// builder.extend(["alice", "bob"]);
/// let index = builder.build();
/// assert_eq!(index.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct IndexBuilder {
    config: Config,
    candidates: Vec<String>,
}

impl IndexBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a builder with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            candidates: Vec::new(),
        }
    }

    /// Queue one candidate. Exact duplicates are dropped at build time.
    pub fn push(&mut self, candidate: impl Into<String>) {
        self.candidates.push(candidate.into());
    }

    /// Number of queued candidates, duplicates included.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether nothing has been queued.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Build the index. Consumes the builder; the result is immutable.
    pub fn build(self) -> Index {
        let started = Instant::now();
        let Self {
            config,
            mut candidates,
        } = self;

        let queued = candidates.len();
        candidates.sort_unstable();
        candidates.dedup();

        let tree = SuffixTree::build(candidates.iter().map(String::as_str), config.folding);
        let index = Index {
            tree,
            candidates: candidates.into_iter().map(String::into_boxed_str).collect(),
            config,
        };
        tracing::debug!(
            queued,
            candidates = index.len(),
            symbols = index.tree.symbol_count(),
            nodes = index.tree.arena().len(),
            elapsed_us = (started.elapsed().as_micros() as u64),
            "built suffix tree index"
        );
        index
    }
}

impl<S: Into<String>> Extend<S> for IndexBuilder {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.candidates.extend(iter.into_iter().map(Into::into));
    }
}

/// An immutable substring index over a set of candidate strings.
///
/// Built once with [`Index::build`] or an [`IndexBuilder`], then queried any
/// number of times, concurrently if desired. There are no mutating methods;
/// to reflect a changed candidate set, build a new index (see
/// [`LiveIndex`](crate::LiveIndex)).
#[derive(Clone)]
pub struct Index {
    tree: SuffixTree,
    /// Distinct original candidates in ascending `str` order.
    candidates: Box<[Box<str>]>,
    config: Config,
}

impl Index {
    /// Build an index with the default configuration.
    pub fn build<I>(candidates: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::build_with(candidates, Config::default())
    }

    /// Build an index with the given configuration.
    pub fn build_with<I>(candidates: I, config: Config) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut builder = IndexBuilder::with_config(config);
        builder.extend(candidates);
        builder.build()
    }

    /// An index with no candidates.
    pub fn empty(config: Config) -> Self {
        IndexBuilder::with_config(config).build()
    }

    /// Number of distinct candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the index holds no candidates.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// The configuration this index was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The case folding policy used for keys and queries.
    pub fn folding(&self) -> CaseFolding {
        self.config.folding
    }

    /// Distinct candidates in result order.
    pub fn candidates(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.candidates.iter().map(|c| &**c)
    }

    /// Candidates whose normalized form contains the normalized `query`,
    /// in ascending order, at most `limit` of them.
    ///
    /// ```rust
    /// use subtrie::Index;
    ///
    /// let index = Index::build(["Kings", "Kingfisher", "alice", "bob"]);
    /// assert_eq!(index.autocomplete("ing", 10), ["Kingfisher", "Kings"]);
    /// assert!(index.autocomplete("z", 10).is_empty());
    /// ```
    pub fn autocomplete(&self, query: &str, limit: usize) -> Vec<&str> {
        if limit == 0 {
            return Vec::new();
        }
        let out: Vec<&str> = self.matches(query).take(limit).collect();
        tracing::trace!(
            query_len = query.len(),
            limit,
            returned = out.len(),
            "autocomplete"
        );
        out
    }

    /// [`autocomplete`](Self::autocomplete) with the configured default limit.
    pub fn suggest(&self, query: &str) -> Vec<&str> {
        self.autocomplete(query, self.config.default_limit)
    }

    /// Every candidate matching `query`, in ascending order.
    pub fn matches(&self, query: &str) -> Matches<'_> {
        Matches {
            index: self,
            ids: self.matching_ids(query).into_iter(),
        }
    }

    /// Whether any candidate contains `query`.
    ///
    /// Every path in the tree spells a substring of some key, so reaching
    /// the end of the query's path is enough.
    pub fn contains_match(&self, query: &str) -> bool {
        if self.is_empty() {
            return false;
        }
        self.tree.locate(&self.symbols(query)).is_some()
    }

    /// Approximate memory usage.
    pub fn stats(&self) -> IndexStats {
        let candidate_bytes = self.candidates.len() * std::mem::size_of::<Box<str>>()
            + self.candidates.iter().map(|c| c.len()).sum::<usize>();
        let arena = self.tree.arena();
        let node_bytes = arena.memory_usage() + self.tree.buffer_bytes();
        let candidates = self.len();
        IndexStats {
            candidates,
            symbols: self.tree.symbol_count(),
            nodes: arena.len(),
            edges: arena.edge_count(),
            payload_entries: arena.payload_count(),
            candidate_bytes,
            node_bytes,
            bytes_per_candidate: if candidates > 0 {
                (candidate_bytes + node_bytes) as f64 / candidates as f64
            } else {
                0.0
            },
        }
    }

    /// `query` folded into tree symbols.
    fn symbols(&self, query: &str) -> Vec<Symbol> {
        let mut out = Vec::with_capacity(query.len());
        self.config.folding.fold_each(query, |c| out.push(c as Symbol));
        out
    }

    /// Sorted, deduplicated ids of every candidate matching `query`.
    fn matching_ids(&self, query: &str) -> Vec<CandidateId> {
        if query.is_empty() {
            return (0..self.candidates.len() as CandidateId).collect();
        }
        match self.tree.locate(&self.symbols(query)) {
            Some(node) => self.tree.candidates_below(node),
            None => Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn tree(&self) -> &SuffixTree {
        &self.tree
    }
}

impl<S: Into<String>> FromIterator<S> for Index {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::build(iter)
    }
}

impl Default for Index {
    fn default() -> Self {
        Self::empty(Config::default())
    }
}

impl fmt::Debug for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index")
            .field("candidates", &self.len())
            .field("nodes", &self.tree.arena().len())
            .field("folding", &self.config.folding)
            .finish()
    }
}

/// Iterator returned by [`Index::matches`].
pub struct Matches<'a> {
    index: &'a Index,
    ids: std::vec::IntoIter<CandidateId>,
}

impl<'a> Iterator for Matches<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.ids.next()?;
        Some(&self.index.candidates[id as usize])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl ExactSizeIterator for Matches<'_> {}
