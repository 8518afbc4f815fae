//! Error types for alias store and configuration operations.
//!
//! [`DatabaseError`] covers every failure mode of loading: I/O, YAML
//! configuration and alias source syntax. Syntax problems carry a
//! [`ParseError`] locating the offending line and alias.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading configuration or alias sources.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A specific source file or directory could not be read.
    #[error("cannot read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Alias source syntax error.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// What went wrong on a line of an alias source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// The alias name is already defined (possibly in an earlier source).
    #[error("duplicate alias '{0}'")]
    DuplicateAlias(String),
    /// A header line was not followed by any URL entry.
    #[error("alias has no URL entries")]
    NoUrlEntries,
    /// An option is empty, has an invalid key or an empty value.
    #[error("malformed option '{0}'")]
    MalformedOption(String),
    /// A `<>` marker with nothing after it, or a stray `<`.
    #[error("unterminated option list")]
    UnterminatedOptions,
    /// An indented URL entry line appears before any alias header.
    #[error("URL entry outside of an alias")]
    OrphanEntry,
    /// A header line has options but no name.
    #[error("empty alias name")]
    EmptyName,
    /// Two `<|>` separators with nothing between them.
    #[error("empty URL entry")]
    EmptyEntry,
}

/// Syntax error located in an alias source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{origin}:{line}: {}{kind}", alias_prefix(.alias))]
pub struct ParseError {
    /// Name of the source (usually its path).
    pub origin: String,
    /// 1-based line number.
    pub line: usize,
    /// Alias being defined when the error occurred, if any.
    pub alias: Option<String>,
    pub kind: ParseErrorKind,
}

fn alias_prefix(alias: &Option<String>) -> String {
    alias
        .as_ref()
        .map(|name| format!("alias '{name}': "))
        .unwrap_or_default()
}

/// Convenience alias for results with [`DatabaseError`].
pub type Result<T> = std::result::Result<T, DatabaseError>;
