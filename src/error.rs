//! Error type for index operations.
//!
//! Almost every input is valid: empty candidates, empty queries and
//! characters that never occur in the index all produce well-defined
//! (possibly empty) results. Only argument validation at the boundary and
//! failures of an external [`CandidateSource`](crate::CandidateSource) are
//! reported.

/// Errors reported by the autocomplete engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An argument was outside its domain, e.g. a negative result limit.
    #[error("invalid argument `{name}`: {value} (must be non-negative)")]
    InvalidArgument {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value.
        value: i64,
    },

    /// The candidate source failed while refreshing a live index.
    #[error("candidate source failed: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Validate a caller-supplied result limit.
///
/// Negative values are rejected rather than clamped.
pub(crate) fn check_limit(limit: i64) -> Result<usize> {
    if limit < 0 {
        return Err(Error::InvalidArgument {
            name: "limit",
            value: limit,
        });
    }
    // Limits beyond the address space cannot truncate anything anyway.
    Ok(usize::try_from(limit).unwrap_or(usize::MAX))
}
