//! Alias source parsing, alias store loading and user configuration.
//!
//! This crate turns alias definition text into an immutable [`AliasStore`]
//! and loads the YAML [`Settings`] that name handlers, defaults and the
//! alias files to read.
//!
//! # Quick start
//!
//! ```no_run
//! use webalias_db::{AliasStore, Settings};
//!
//! // Load settings, falling back to defaults when no file exists
//! let path = Settings::default_path().unwrap();
//! let settings = Settings::load_or_default(&path).unwrap();
//!
//! // Build the store from the configured alias files
//! let store = settings.store_builder(&path).build().unwrap();
//! if let Some(alias) = store.get("gh") {
//!     println!("gh has {} URL entries", alias.url_entries.len());
//! }
//!
//! // Or assemble sources explicitly
//! let store = AliasStore::builder()
//!     .from_file("aliases")
//!     .from_dir("aliases.d")
//!     .from_text("inline", "ddg https://duckduckgo.com/?q={search\\+}\n")
//!     .build()
//!     .unwrap();
//! ```

mod config;
mod error;
mod loader;
mod parser;

pub use config::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, DumpConfig, Settings};
pub use error::{DatabaseError, ParseError, ParseErrorKind, Result};
pub use loader::{AliasMatch, AliasStore, SourceOrigin, StoreBuilder};
pub use parser::{AliasSource, ENTRY_SEPARATOR, OPTION_MARKER, ParsedAlias, parse_source};
