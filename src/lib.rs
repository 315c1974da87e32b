//! # subtrie
//!
//! Substring autocomplete for short names, backed by a generalized suffix
//! tree.
//!
//! Every suffix of every candidate lives in one shared, path-compressed
//! tree, so a query is answered by walking its characters from the root and
//! collecting the candidates labelling the leaves below where it lands. The
//! tree is built in time and space linear in the total length of the
//! candidates. Lookup cost is proportional to the query length plus the size
//! of the matching subtree, independent of how many candidates do not match.
//!
//! Matching is case-insensitive (see [`CaseFolding`]), results are the
//! original strings in ascending `str` order, capped by a limit.
//!
//! ## Example
//!
//! ```rust
//! let index = subtrie::build(["Kings", "Kingfisher", "alice", "bob"]);
//!
//! assert_eq!(
//!     subtrie::autocomplete(&index, "ING", 10).unwrap(),
//!     ["Kingfisher", "Kings"]
//! );
//! assert_eq!(subtrie::autocomplete(&index, "", 2).unwrap(), ["Kingfisher", "Kings"]);
//! assert!(subtrie::autocomplete(&index, "z", 10).unwrap().is_empty());
//! assert!(subtrie::autocomplete(&index, "a", -1).is_err());
//! ```
//!
//! ## Long-lived indexes
//!
//! An [`Index`] is immutable. Services that see their candidate set change
//! keep a [`LiveIndex`] and refresh it from a [`CandidateSource`]; queries
//! always read the most recently published index.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod index;
pub mod live;
pub mod node;
pub mod normalize;
mod suffix_tree;

pub use error::{Error, Result};
pub use index::{Index, IndexBuilder, IndexStats, Matches};
pub use live::{CandidateSource, FnSource, LiveIndex};
pub use normalize::{normalize, CaseFolding};

use serde::{Deserialize, Serialize};

/// Result cap used when the caller does not pass one.
pub const DEFAULT_LIMIT: usize = 10;

/// Configuration for building and querying an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of results returned by `suggest`.
    pub default_limit: usize,
    /// Case folding applied to candidates and queries.
    pub folding: CaseFolding,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            folding: CaseFolding::Unicode,
        }
    }
}

impl Config {
    /// Set the default result cap.
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    /// Set the case folding policy.
    pub fn with_folding(mut self, folding: CaseFolding) -> Self {
        self.folding = folding;
        self
    }
}

/// Build an index over `candidates` with the default configuration.
pub fn build<I>(candidates: I) -> Index
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    Index::build(candidates)
}

/// Candidates of `index` containing `query`, sorted and capped at `limit`.
///
/// A negative `limit` is rejected with [`Error::InvalidArgument`]. Every
/// other input, including an empty query or one that matches nothing, is
/// valid.
pub fn autocomplete(index: &Index, query: &str, limit: i64) -> Result<Vec<String>> {
    let limit = error::check_limit(limit)?;
    Ok(index
        .autocomplete(query, limit)
        .into_iter()
        .map(str::to_owned)
        .collect())
}

/// JSON body of an autocomplete response: `{"autocomplete": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteResponse {
    /// Suggested names, in result order.
    pub autocomplete: Vec<String>,
}

impl From<Vec<String>> for AutocompleteResponse {
    fn from(autocomplete: Vec<String>) -> Self {
        Self { autocomplete }
    }
}

impl<'a> From<Vec<&'a str>> for AutocompleteResponse {
    fn from(matches: Vec<&'a str>) -> Self {
        Self {
            autocomplete: matches.into_iter().map(str::to_owned).collect(),
        }
    }
}


#[cfg(test)]
mod proptests;
