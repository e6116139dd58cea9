#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! With the `tracing` feature the usual macros are re-exported from
//! `tracing`. Without it, no-op macros with the same names are exported at
//! the crate root so call sites compile unchanged.

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, error, info, info_span, trace, warn};

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op debug macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op debug_span macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    /// No-op error macro when tracing is disabled.
    #[macro_export]
    macro_rules! error {
        ($($arg:tt)*) => {};
    }

    /// No-op info macro when tracing is disabled.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    /// No-op info_span macro when tracing is disabled.
    #[macro_export]
    macro_rules! info_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    /// No-op trace macro when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op warn macro when tracing is disabled.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }
}

/// Span stand-in returned by the no-op span macros.
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy)]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Enter the span (does nothing).
    pub fn enter(&self) -> NoopGuard {
        NoopGuard
    }

    /// Enter the span by value (does nothing).
    pub fn entered(self) -> NoopGuard {
        NoopGuard
    }
}

/// Guard returned by [`NoopSpan::enter`].
#[cfg(not(feature = "tracing"))]
#[derive(Debug)]
pub struct NoopGuard;

#[cfg(all(test, not(feature = "tracing")))]
mod tests {
    #[test]
    fn noop_macros_accept_tracing_syntax() {
        let pairs = 3;
        crate::debug!(pairs, "partition recomputed");
        let _ = pairs;
        crate::info!(target: "tagflow", "mounted");
        crate::warn!("threshold clamped: {}", -1);
        let _guard = crate::debug_span!("widget_render", widget = "Tag").entered();
    }
}
