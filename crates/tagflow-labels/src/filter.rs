#![forbid(unsafe_code)]

//! Case-insensitive substring filtering over a whole label set.
//!
//! A pair matches when its key or its value contains the query, compared
//! after Unicode lowercasing. The empty query matches everything. Results
//! keep the relative order of the input.

use crate::label::{LabelPair, LabelSet};

/// A search query with its lowercased form computed once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterQuery {
    raw: String,
    folded: String,
}

impl FilterQuery {
    pub fn new(query: impl Into<String>) -> Self {
        let raw = query.into();
        let folded = raw.to_lowercase();
        Self { raw, folded }
    }

    /// The query as typed.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Whether `pair` passes the filter.
    pub fn matches(&self, pair: &LabelPair) -> bool {
        if self.folded.is_empty() {
            return true;
        }
        contains_folded(&pair.key, &self.folded) || contains_folded(&pair.value, &self.folded)
    }
}

fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    if haystack.is_ascii() && folded_needle.is_ascii() {
        return haystack
            .as_bytes()
            .windows(folded_needle.len())
            .any(|w| w.eq_ignore_ascii_case(folded_needle.as_bytes()));
    }
    haystack.to_lowercase().contains(folded_needle)
}

/// Positions in `labels` of every pair matching `query`, in order.
pub fn filter_indices(labels: &[LabelPair], query: &FilterQuery) -> Vec<usize> {
    labels
        .iter()
        .enumerate()
        .filter(|(_, pair)| query.matches(pair))
        .map(|(i, _)| i)
        .collect()
}

/// The subset of `labels` matching `query`, as a new set.
pub fn compute_filtered_view(labels: &[LabelPair], query: &str) -> LabelSet {
    let query = FilterQuery::new(query);
    labels
        .iter()
        .filter(|pair| query.matches(pair))
        .cloned()
        .collect()
}
