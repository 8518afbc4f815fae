//! Core alias types and the pure stages of URL resolution.
//!
//! This crate holds everything that does not touch the file system or spawn
//! processes:
//!
//! - [`AliasDefinition`] / [`UrlEntry`] / [`OptionSet`]: the alias model
//!   produced by the alias store.
//! - [`substitute`]: expands `{search}` placeholders with percent-encoded
//!   search terms.
//! - [`OptionMerger`]: folds defaults, alias options, URL options and
//!   command-line flags into an [`EffectiveConfig`] and validates the
//!   handler against the [`HandlerRegistry`].
//! - [`group`]: batches resolved URLs into [`ResolvedAction`]s.
//!
//! # Example
//!
//! ```
//! use webalias_core::*;
//!
//! let mut registry = HandlerRegistry::new();
//! registry.insert("gui1", HandlerEntry::new("firefox"));
//! registry.insert("term1", HandlerEntry::new("w3m"));
//! let probe = |_: &str| true;
//! let merger = OptionMerger::new(
//!     EffectiveConfig::for_handler("gui1").unwrap(),
//!     "term1",
//!     CliOverride::default(),
//!     &registry,
//!     &probe,
//! );
//!
//! let alias = AliasDefinition::new("gh")
//!     .with_entry(UrlEntry::new("https://github.com/{search}"));
//! let args = vec!["golang/go".to_string()];
//!
//! let mut resolved = Vec::new();
//! for entry in &alias.url_entries {
//!     let url = substitute(&entry.template, &args, Requirement::Optional).unwrap();
//!     resolved.push((url, merger.merge(&alias, entry).unwrap()));
//! }
//! let actions = group(resolved);
//!
//! assert_eq!(actions.len(), 1);
//! assert_eq!(actions[0].handler_name, "gui1");
//! assert_eq!(actions[0].urls, vec!["https://github.com/golang/go"]);
//! ```

mod error;
mod group;
mod merge;
mod registry;
mod substitute;
mod types;

pub use error::{ResolveError, Result};
pub use group::group;
pub use merge::OptionMerger;
pub use registry::{CommandProbe, HandlerEntry, HandlerRegistry};
pub use substitute::{
    PLUS_PLACEHOLDERS, Requirement, SEARCH_PLACEHOLDER, has_placeholder, substitute,
};
pub use types::*;
