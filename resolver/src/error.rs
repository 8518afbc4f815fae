//! Error type for resolution and dispatch.

use thiserror::Error;
use webalias_core::ResolveError;

/// Errors that can occur while resolving or dispatching an invocation.
#[derive(Debug, Error)]
pub enum Error {
    /// Option, handler or placeholder failure.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The configured TLD list does not form a valid pattern.
    #[error("invalid TLD pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Spawning or talking to an external process failed.
    #[error("failed to launch '{target}': {source}")]
    Launch {
        target: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
