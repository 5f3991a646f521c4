//! Error types for the flowpipe pipeline

use thiserror::Error;

/// Result type for flowpipe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline error types
///
/// Errors fall into two tiers. `Recoverable` marks a single envelope as
/// unprocessable; the orchestrator logs it and continues with the next
/// envelope. Every other variant is fatal and terminates the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or lookup error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Plugin name could not be resolved to an implementation
    #[error("Plugin resolution error: {0}")]
    Resolve(String),

    /// A single envelope could not be decoded; the pipeline continues
    #[error("Recoverable decode error: {0}")]
    Recoverable(String),

    /// Plugin runtime error (fatal)
    #[error("Plugin error: {0}")]
    Plugin(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error only affects the envelope currently in flight.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Recoverable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_predicate() {
        assert!(Error::Recoverable("bad frame".into()).is_recoverable());
        assert!(!Error::Plugin("broken".into()).is_recoverable());
        assert!(!Error::Resolve("missing".into()).is_recoverable());
    }
}
