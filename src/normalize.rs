//! Key normalization shared by insertion and lookup.
//!
//! Both sides of the index must fold strings identically, otherwise a
//! query could walk a path that insertion never created. Folding is applied
//! per Unicode scalar value with no context, so the folding of a substring
//! is always a substring of the folding of the whole string.

use serde::{Deserialize, Serialize};

/// Case folding policy applied to candidates and queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseFolding {
    /// Full Unicode lowercase mapping of every scalar value.
    ///
    /// A single scalar value may expand to several (`'İ'` folds to
    /// `"i\u{307}"`).
    #[default]
    Unicode,
    /// Only ASCII letters are folded; everything else is kept verbatim.
    Ascii,
}

impl CaseFolding {
    /// Fold `input` into a sequence of transition units, feeding each one to
    /// `sink`. Avoids allocating for callers that feed the tree directly.
    #[inline]
    pub fn fold_each(self, input: &str, mut sink: impl FnMut(char)) {
        match self {
            CaseFolding::Unicode => {
                for c in input.chars() {
                    if c.is_ascii() {
                        sink(c.to_ascii_lowercase());
                    } else {
                        c.to_lowercase().for_each(&mut sink);
                    }
                }
            }
            CaseFolding::Ascii => input.chars().for_each(|c| sink(c.to_ascii_lowercase())),
        }
    }

    /// Fold `input` into a vector of transition units.
    pub fn fold(self, input: &str) -> Vec<char> {
        let mut out = Vec::with_capacity(input.len());
        self.fold_each(input, |c| out.push(c));
        out
    }

    /// Fold `input` into a normalized key string.
    pub fn normalize(self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        self.fold_each(input, |c| out.push(c));
        out
    }
}

/// Normalize `input` with the default ([`CaseFolding::Unicode`]) policy.
///
/// ```rust
/// assert_eq!(subtrie::normalize("KingFisher"), "kingfisher");
/// assert_eq!(subtrie::normalize(""), "");
/// ```
pub fn normalize(input: &str) -> String {
    CaseFolding::default().normalize(input)
}
