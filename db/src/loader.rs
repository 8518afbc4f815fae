//! Alias store loading with a builder over files, directories and text.
//!
//! Provides [`AliasStore`] for in-memory alias lookup and [`StoreBuilder`]
//! for assembling a store from several sources. Every source is loaded and
//! the aliases are concatenated in the order the sources were added; a name
//! defined twice is a parse error, whichever source the second definition
//! comes from.
//!
//! # Loading patterns
//!
//! ```no_run
//! use webalias_db::AliasStore;
//!
//! let store = AliasStore::builder()
//!     .from_file("/etc/webalias/aliases")
//!     .from_dir("/home/me/.config/webalias/aliases.d")
//!     .build()
//!     .unwrap();
//! assert!(store.get("gh").is_some());
//! ```
//!
//! All lookups are O(1) via the internal `HashMap`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use webalias_core::AliasDefinition;

use crate::error::{DatabaseError, ParseError, ParseErrorKind, Result};
use crate::parser::{AliasSource, parse_source};

/// Describes where alias text is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    /// A single alias file.
    File(PathBuf),
    /// Every regular, non-hidden file in a directory, in file-name order.
    Directory(PathBuf),
    /// In-memory text with a display name.
    Text { name: String, text: String },
}

/// Aliases matched by [`AliasStore::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasMatch<'a> {
    /// Matched aliases in argument order.
    pub aliases: Vec<&'a AliasDefinition>,
    /// Number of leading arguments consumed as alias names.
    pub consumed: usize,
    /// Arguments left over for placeholder substitution.
    pub remaining: Vec<String>,
}

/// Immutable in-memory collection of aliases with O(1) lookup by name.
///
/// The store is never mutated by lookups and can be shared between threads.
///
/// # Examples
///
/// ```
/// use webalias_db::{AliasSource, AliasStore};
///
/// let store = AliasStore::load(&[AliasSource::new(
///     "inline",
///     "gh https://github.com/{search}\nwiki<>dump https://en.wikipedia.org/wiki/{search}\n",
/// )])
/// .unwrap();
///
/// let args: Vec<String> = vec!["gh".into(), "golang/go".into()];
/// let found = store.resolve(&args, false).unwrap();
/// assert_eq!(found.aliases[0].name, "gh");
/// assert_eq!(found.consumed, 1);
/// assert_eq!(found.remaining, vec!["golang/go"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AliasStore {
    aliases: Vec<AliasDefinition>,
    index: HashMap<String, usize>,
    sources: Vec<String>,
}

impl AliasStore {
    /// Returns a new [`StoreBuilder`].
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    /// Parses `sources` in order into one store.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`], including
    /// [`ParseErrorKind::DuplicateAlias`] when a name is defined twice.
    pub fn load(sources: &[AliasSource]) -> std::result::Result<Self, ParseError> {
        let mut store = Self::default();
        for source in sources {
            for parsed in parse_source(source)? {
                let name = parsed.definition.name.clone();
                if store.index.contains_key(&name) {
                    return Err(ParseError {
                        origin: source.name.clone(),
                        line: parsed.line,
                        alias: Some(name.clone()),
                        kind: ParseErrorKind::DuplicateAlias(name),
                    });
                }
                store.index.insert(name, store.aliases.len());
                store.aliases.push(parsed.definition);
            }
            store.sources.push(source.name.clone());
        }
        debug!(
            aliases = store.aliases.len(),
            sources = store.sources.len(),
            "loaded alias store"
        );
        Ok(store)
    }

    /// Matches leading arguments against alias names.
    ///
    /// In single-alias mode only the first argument is tested. In multi-alias
    /// mode leading arguments are consumed until one is not an alias name.
    /// Returns `None` when nothing matched.
    pub fn resolve(&self, args: &[String], multi_alias: bool) -> Option<AliasMatch<'_>> {
        let limit = if multi_alias { args.len() } else { args.len().min(1) };
        let aliases: Vec<&AliasDefinition> = args[..limit]
            .iter()
            .map_while(|arg| self.get(arg))
            .collect();

        if aliases.is_empty() {
            return None;
        }

        let consumed = aliases.len();
        Some(AliasMatch {
            aliases,
            consumed,
            remaining: args[consumed..].to_vec(),
        })
    }

    /// Looks up an alias by exact, case-sensitive name.
    pub fn get(&self, name: &str) -> Option<&AliasDefinition> {
        self.index.get(name).map(|&i| &self.aliases[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Returns alias names in load order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.aliases.iter().map(|a| a.name.as_str())
    }

    /// Iterates aliases in load order.
    pub fn iter(&self) -> impl Iterator<Item = &AliasDefinition> {
        self.aliases.iter()
    }

    /// Names of the sources the store was built from.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }
}

/// Builder for constructing an [`AliasStore`] from several origins.
///
/// # Example
///
/// ```
/// use webalias_db::AliasStore;
///
/// let store = AliasStore::builder()
///     .from_text("base", "gh https://github.com/{search}\n")
///     .from_text("extra", "rs https://docs.rs/{search}\n")
///     .build()
///     .unwrap();
/// assert_eq!(store.names().collect::<Vec<_>>(), vec!["gh", "rs"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StoreBuilder {
    origins: Vec<SourceOrigin>,
}

impl StoreBuilder {
    /// Creates a new builder with no sources.
    pub fn new() -> Self {
        Self {
            origins: Vec::new(),
        }
    }

    /// Adds an alias file.
    pub fn from_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.origins.push(SourceOrigin::File(path.into()));
        self
    }

    /// Adds every file of a directory.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.origins.push(SourceOrigin::Directory(path.into()));
        self
    }

    /// Adds in-memory alias text.
    pub fn from_text(mut self, name: &str, text: &str) -> Self {
        self.origins.push(SourceOrigin::Text {
            name: name.to_string(),
            text: text.to_string(),
        });
        self
    }

    /// Adds a path as a file or directory source depending on what it is.
    ///
    /// Missing paths are skipped with a warning.
    pub fn from_path_if_exists(self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if path.is_dir() {
            self.from_dir(path)
        } else if path.exists() {
            self.from_file(path)
        } else {
            warn!(path = %path.display(), "alias source does not exist, skipping");
            self
        }
    }

    /// Returns the configured origins.
    pub fn origins(&self) -> &[SourceOrigin] {
        &self.origins
    }

    /// Reads every origin and parses the result into one store.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::ReadError`] if a file or directory cannot be
    /// read and [`DatabaseError::Parse`] on a syntax error.
    pub fn build(self) -> Result<AliasStore> {
        let mut sources = Vec::new();
        for origin in self.origins {
            match origin {
                SourceOrigin::File(path) => sources.push(read_source(&path)?),
                SourceOrigin::Directory(path) => sources.extend(read_dir_sources(&path)?),
                SourceOrigin::Text { name, text } => sources.push(AliasSource { name, text }),
            }
        }
        Ok(AliasStore::load(&sources)?)
    }
}

fn read_source(path: &Path) -> Result<AliasSource> {
    let text = std::fs::read_to_string(path).map_err(|source| DatabaseError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(AliasSource {
        name: path.display().to_string(),
        text,
    })
}

fn read_dir_sources(dir: &Path) -> Result<Vec<AliasSource>> {
    let read_error = |source| DatabaseError::ReadError {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if path.is_file() && !hidden {
            files.push(path);
        }
    }
    files.sort();

    files.iter().map(|path| read_source(path)).collect()
}
