//! A long-lived index that is replaced wholesale when candidates change.
//!
//! Queries take a cheap `Arc` snapshot of the current [`Index`] and run
//! without holding any lock. A refresh builds the replacement outside the
//! lock and only takes the write lock for the pointer swap, so readers
//! never observe a partially built tree.

use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{check_limit, Error, Result};
use crate::{Config, Index};

/// Supplies the current universe of known names.
///
/// This is the seam to the user directory: the engine never persists or
/// validates what the source returns.
pub trait CandidateSource {
    /// Error raised when the candidates can't be fetched.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch every candidate, in any order.
    fn candidates(&self) -> std::result::Result<Vec<String>, Self::Error>;
}

impl CandidateSource for Vec<String> {
    type Error = Infallible;

    fn candidates(&self) -> std::result::Result<Vec<String>, Infallible> {
        Ok(self.clone())
    }
}

impl CandidateSource for [&str] {
    type Error = Infallible;

    fn candidates(&self) -> std::result::Result<Vec<String>, Infallible> {
        Ok(self.iter().map(|s| s.to_string()).collect())
    }
}

/// Adapts a closure into a [`CandidateSource`].
///
/// ```rust
/// use subtrie::{FnSource, LiveIndex};
///
/// let source = FnSource(|| Ok::<_, std::io::Error>(vec!["alice".to_string()]));
/// let live = LiveIndex::default();
/// live.refresh(&source).unwrap();
/// assert_eq!(live.suggest("LI"), ["alice"]);
/// ```
pub struct FnSource<F>(pub F);

impl<F, E> CandidateSource for FnSource<F>
where
    F: Fn() -> std::result::Result<Vec<String>, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn candidates(&self) -> std::result::Result<Vec<String>, E> {
        (self.0)()
    }
}

/// Holder for the index currently used to answer queries.
pub struct LiveIndex {
    current: RwLock<Arc<Index>>,
    generation: AtomicU64,
    config: Config,
}

impl LiveIndex {
    /// Start with an empty index.
    pub fn new(config: Config) -> Self {
        Self::from_index(Index::empty(config))
    }

    /// Start from an already built index, adopting its configuration.
    pub fn from_index(index: Index) -> Self {
        let config = index.config().clone();
        Self {
            current: RwLock::new(Arc::new(index)),
            generation: AtomicU64::new(0),
            config,
        }
    }

    /// Snapshot of the current index.
    ///
    /// The snapshot stays valid and unchanged even if a swap happens while
    /// the caller is still using it.
    pub fn current(&self) -> Arc<Index> {
        self.current.read().clone()
    }

    /// Number of swaps performed so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Configuration used for rebuilt indexes.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Atomically install `index`, returning the one it replaced.
    pub fn replace(&self, index: Index) -> Arc<Index> {
        let next = Arc::new(index);
        let prev = {
            let mut slot = self.current.write();
            std::mem::replace(&mut *slot, next)
        };
        self.generation.fetch_add(1, Ordering::AcqRel);
        prev
    }

    /// Build a new index from `candidates` and swap it in.
    pub fn rebuild<I>(&self, candidates: I) -> Arc<Index>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.replace(Index::build_with(candidates, self.config.clone()))
    }

    /// Pull candidates from `source`, rebuild and swap.
    ///
    /// On a source error the current index is left in place. Returns the
    /// number of distinct candidates in the new index.
    pub fn refresh<S>(&self, source: &S) -> Result<usize>
    where
        S: CandidateSource + ?Sized,
    {
        let candidates = match source.candidates() {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(
                    generation = self.generation(),
                    error = %e,
                    "candidate source failed, keeping current index"
                );
                return Err(Error::Source(Box::new(e)));
            }
        };
        let index = Index::build_with(candidates, self.config.clone());
        let len = index.len();
        self.replace(index);
        tracing::info!(
            generation = self.generation(),
            candidates = len,
            "refreshed live index"
        );
        Ok(len)
    }

    /// Query the current index, validating `limit`.
    pub fn autocomplete(&self, query: &str, limit: i64) -> Result<Vec<String>> {
        let limit = check_limit(limit)?;
        Ok(to_owned(self.current().autocomplete(query, limit)))
    }

    /// Query the current index with the configured default limit.
    pub fn suggest(&self, query: &str) -> Vec<String> {
        to_owned(self.current().suggest(query))
    }
}

impl Default for LiveIndex {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl std::fmt::Debug for LiveIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveIndex")
            .field("generation", &self.generation())
            .field("current", &*self.current())
            .finish()
    }
}

fn to_owned(matches: Vec<&str>) -> Vec<String> {
    matches.into_iter().map(str::to_owned).collect()
}
