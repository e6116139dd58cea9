#![forbid(unsafe_code)]

use std::fmt;
use std::io;

use tagflow_labels::LabelLoadError;

/// Anything that stops the demo before or during the event loop.
#[derive(Debug)]
pub enum DemoError {
    Io(io::Error),
    Labels(LabelLoadError),
    /// The log file could not be opened or a subscriber was already set.
    Logging(String),
}

impl fmt::Display for DemoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemoError::Io(err) => write!(f, "terminal I/O failed: {err}"),
            DemoError::Labels(err) => write!(f, "could not load labels: {err}"),
            DemoError::Logging(msg) => write!(f, "could not start logging: {msg}"),
        }
    }
}

impl std::error::Error for DemoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DemoError::Io(err) => Some(err),
            DemoError::Labels(err) => Some(err),
            DemoError::Logging(_) => None,
        }
    }
}

impl From<io::Error> for DemoError {
    fn from(err: io::Error) -> Self {
        DemoError::Io(err)
    }
}

impl From<LabelLoadError> for DemoError {
    fn from(err: LabelLoadError) -> Self {
        DemoError::Labels(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn display_and_source() {
        let err = DemoError::from(io::Error::other("boom"));
        assert_eq!(err.to_string(), "terminal I/O failed: boom");
        assert!(err.source().is_some());
        let err = DemoError::Logging("busy".into());
        assert!(err.source().is_none());
    }
}
