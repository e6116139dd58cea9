#![forbid(unsafe_code)]

//! Splitting a label set into inline, overflow, and remaining tiers.
//!
//! # Invariants
//!
//! 1. `visible ++ overflow ++ remaining == labels`, order preserved.
//! 2. `hidden_count == overflow.len() + remaining.len()`.
//! 3. `hidden_count == 0` whenever `labels.len() <= max_visible`; in that
//!    case `overflow` and `remaining` are empty.

use crate::label::LabelPair;

/// Default number of tags rendered inline.
pub const DEFAULT_MAX_VISIBLE: usize = 2;
/// Default number of tags in the overflow popover.
pub const DEFAULT_MAX_OVERFLOW: usize = 5;

/// Size limits for the first two tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Thresholds {
    pub max_visible: usize,
    pub max_overflow: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_visible: DEFAULT_MAX_VISIBLE,
            max_overflow: DEFAULT_MAX_OVERFLOW,
        }
    }
}

impl Thresholds {
    pub const fn new(max_visible: usize, max_overflow: usize) -> Self {
        Self {
            max_visible,
            max_overflow,
        }
    }

    /// Build from signed values, clamping negatives to zero.
    pub fn from_signed(max_visible: i64, max_overflow: i64) -> Self {
        #[cfg(feature = "tracing")]
        if max_visible < 0 || max_overflow < 0 {
            tracing::debug!(max_visible, max_overflow, "negative threshold clamped to 0");
        }
        let clamp = |n: i64| usize::try_from(n.max(0)).unwrap_or(usize::MAX);
        Self::new(clamp(max_visible), clamp(max_overflow))
    }
}

/// The three tiers of a label set, borrowed from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionView<'a> {
    /// Rendered inline.
    pub visible: &'a [LabelPair],
    /// Rendered in the overflow popover.
    pub overflow: &'a [LabelPair],
    /// Only reachable through the search modal.
    pub remaining: &'a [LabelPair],
    /// Tags not rendered inline; the `+N` count.
    pub hidden_count: usize,
}

impl PartitionView<'_> {
    /// Whether the `+N` overflow control exists.
    pub fn has_overflow_control(&self) -> bool {
        self.hidden_count > 0
    }

    /// Whether the "show more" control inside the popover exists.
    pub fn has_more_control(&self) -> bool {
        !self.remaining.is_empty()
    }
}

/// Split `labels` by `thresholds`. O(1): the tiers are subslices.
pub fn compute_partition(labels: &[LabelPair], thresholds: Thresholds) -> PartitionView<'_> {
    let visible_end = thresholds.max_visible.min(labels.len());
    let overflow_end = visible_end
        .saturating_add(thresholds.max_overflow)
        .min(labels.len());
    PartitionView {
        visible: &labels[..visible_end],
        overflow: &labels[visible_end..overflow_end],
        remaining: &labels[overflow_end..],
        hidden_count: labels.len().saturating_sub(thresholds.max_visible),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::LabelSet;

    fn numbered(n: usize) -> LabelSet {
        (1..=n)
            .map(|i| (format!("tag{i}"), format!("value{i}")))
            .collect()
    }

    fn keys(pairs: &[LabelPair]) -> Vec<&str> {
        pairs.iter().map(|p| p.key.as_str()).collect()
    }

    #[test]
    fn ten_labels_with_defaults() {
        let labels = numbered(10);
        let view = compute_partition(&labels, Thresholds::default());
        assert_eq!(keys(view.visible), ["tag1", "tag2"]);
        assert_eq!(keys(view.overflow), ["tag3", "tag4", "tag5", "tag6", "tag7"]);
        assert_eq!(keys(view.remaining), ["tag8", "tag9", "tag10"]);
        assert_eq!(view.hidden_count, 8);
        assert!(view.has_overflow_control());
        assert!(view.has_more_control());
    }

    #[test]
    fn fifteen_labels_with_four_visible() {
        let labels = numbered(15);
        let view = compute_partition(&labels, Thresholds::new(4, 5));
        assert_eq!(view.hidden_count, 11);
        assert_eq!(keys(view.overflow), ["tag5", "tag6", "tag7", "tag8", "tag9"]);
        assert_eq!(view.remaining.len(), 6);
    }

    #[test]
    fn empty_set_has_no_controls() {
        let labels = LabelSet::new();
        let view = compute_partition(&labels, Thresholds::default());
        assert!(view.visible.is_empty());
        assert_eq!(view.hidden_count, 0);
        assert!(!view.has_overflow_control());
        assert!(!view.has_more_control());
    }

    #[test]
    fn exactly_max_visible_has_no_controls() {
        let labels = numbered(2);
        let view = compute_partition(&labels, Thresholds::default());
        assert_eq!(view.visible.len(), 2);
        assert!(view.overflow.is_empty());
        assert!(view.remaining.is_empty());
        assert!(!view.has_overflow_control());
    }

    #[test]
    fn overflow_without_remaining() {
        let labels = numbered(6);
        let view = compute_partition(&labels, Thresholds::default());
        assert_eq!(view.hidden_count, 4);
        assert_eq!(view.overflow.len(), 4);
        assert!(!view.has_more_control());
    }

    #[test]
    fn zero_thresholds_push_everything_to_remaining() {
        let labels = numbered(3);
        let view = compute_partition(&labels, Thresholds::new(0, 0));
        assert!(view.visible.is_empty());
        assert!(view.overflow.is_empty());
        assert_eq!(view.remaining.len(), 3);
        assert_eq!(view.hidden_count, 3);
    }

    #[test]
    fn huge_thresholds_do_not_overflow() {
        let labels = numbered(3);
        let view = compute_partition(&labels, Thresholds::new(1, usize::MAX));
        assert_eq!(view.overflow.len(), 2);
        assert!(view.remaining.is_empty());
    }

    #[test]
    fn signed_thresholds_clamp_negatives() {
        assert_eq!(Thresholds::from_signed(-3, 4), Thresholds::new(0, 4));
        assert_eq!(Thresholds::from_signed(2, -1), Thresholds::new(2, 0));
        assert_eq!(Thresholds::from_signed(2, 5), Thresholds::default());
    }
}
