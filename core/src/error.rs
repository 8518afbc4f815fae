//! Error types for alias resolution.
//!
//! Every variant is terminal for the current invocation: the resolver
//! surfaces the first error and nothing is dispatched.

use thiserror::Error;

/// Errors raised while substituting, merging and validating resolved URLs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// An option carries a value that cannot be interpreted.
    #[error("alias '{alias}': invalid value '{value}' for option '{key}'")]
    InvalidOption {
        alias: String,
        key: String,
        value: String,
    },

    /// The handler has no registry entry, or its command line is empty.
    #[error("handler '{0}' is not configured")]
    HandlerNotConfigured(String),

    /// The handler's program cannot be found.
    #[error("handler '{handler}': command '{command}' not found")]
    HandlerNotFound { handler: String, command: String },

    /// A placeholder was required but the template has none.
    #[error("template '{0}' has no search placeholder")]
    MalformedTemplate(String),

    /// A placeholder was required but there is nothing to put in it.
    #[error("no search terms given for '{0}'")]
    EmptyQuery(String),

    /// Mutually exclusive options were requested together.
    #[error("incompatible options: {0}")]
    IncompatibleOptions(String),

    /// Multi-alias mode matched no alias at all.
    #[error("no aliases found in: {0}")]
    NoAliasesFound(String),
}

/// Convenience alias for results with [`ResolveError`].
pub type Result<T> = std::result::Result<T, ResolveError>;
