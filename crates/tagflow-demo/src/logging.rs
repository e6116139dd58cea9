#![forbid(unsafe_code)]

//! File logging for the demo.
//!
//! The terminal is owned by the UI, so log records go to a file. The
//! filter directive comes from `TAGFLOW_LOG` (or `--log-filter`).

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::DemoError;

/// Filter used when the directive is empty or does not parse.
pub const DEFAULT_FILTER: &str = "info";

/// Parse `directive`, falling back to [`DEFAULT_FILTER`].
pub fn env_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a global subscriber appending plain-text records to `path`.
pub fn init(path: &Path, directive: &str) -> Result<(), DemoError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| DemoError::Logging(format!("{}: {err}", path.display())))?;

    tracing_subscriber::registry()
        .with(env_filter(directive))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()
        .map_err(|err| DemoError::Logging(err.to_string()))?;

    tracing::info!(log_file = %path.display(), filter = directive, "logging started");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_directive_falls_back() {
        let filter = env_filter("tagflow=loudest");
        assert_eq!(filter.to_string(), DEFAULT_FILTER);
        assert_eq!(env_filter("tagflow_widgets=debug").to_string(), "tagflow_widgets=debug");
    }
}
