#![forbid(unsafe_code)]

//! Core: geometry, canonical input events, change feeds, and terminal lifecycle.

pub mod event;
pub mod feed;
pub mod geometry;
pub mod logging;
pub mod terminal_session;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, error, info, info_span, trace, warn};
