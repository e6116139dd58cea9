#![forbid(unsafe_code)]

//! Label model for tagflow.
//!
//! Everything here is pure: building a [`LabelSet`], splitting it into the
//! inline / overflow / remaining tiers, filtering it by a search query, and
//! resolving link targets. No rendering, no I/O beyond loading a label file.
//!
//! # Example
//!
//! ```
//! use tagflow_labels::{LabelSet, Thresholds, compute_partition, compute_filtered_view};
//!
//! let labels: LabelSet = (1..=10)
//!     .map(|i| (format!("tag{i}"), format!("value{i}")))
//!     .collect();
//!
//! let view = compute_partition(&labels, Thresholds::default());
//! assert_eq!(view.visible.len(), 2);
//! assert_eq!(view.overflow.len(), 5);
//! assert_eq!(view.remaining.len(), 3);
//! assert_eq!(view.hidden_count, 8);
//!
//! let hits = compute_filtered_view(&labels, "TAG3");
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].value, "value3");
//! ```

pub mod filter;
pub mod label;
pub mod link;
pub mod partition;

pub use filter::{FilterQuery, compute_filtered_view, filter_indices};
pub use label::{LabelLoadError, LabelPair, LabelSet};
pub use link::{LabelSelectorLinks, LinkContext, LinkResolver, encode_uri_component};
pub use partition::{
    DEFAULT_MAX_OVERFLOW, DEFAULT_MAX_VISIBLE, PartitionView, Thresholds, compute_partition,
};
