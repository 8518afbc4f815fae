//! Alias and dispatch type definitions.
//!
//! This module defines the in-memory model shared by the alias store, the
//! option merger and the dispatcher. All types serialize with [`serde`] so
//! that listings and dry-run output can be rendered as JSON or YAML.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single `key`, `key=value` or `key+value` option attached to an alias or
/// to one of its URL entries.
///
/// # Examples
///
/// ```
/// use webalias_core::AliasOption;
///
/// let flag = AliasOption::flag("dump");
/// assert_eq!(flag.to_string(), "dump");
///
/// let browser = AliasOption::with_value("browser", "gui3");
/// assert_eq!(browser.value.as_deref(), Some("gui3"));
/// assert_eq!(browser.to_string(), "browser=gui3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasOption {
    /// Option key (e.g. `browser`, `dump`).
    pub key: String,
    /// Optional value; `None` for bare flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl AliasOption {
    /// Creates a bare flag option.
    pub fn flag(key: &str) -> Self {
        Self {
            key: key.to_string(),
            value: None,
        }
    }

    /// Creates a `key=value` option.
    pub fn with_value(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: Some(value.to_string()),
        }
    }
}

impl fmt::Display for AliasOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.key, value),
            None => f.write_str(&self.key),
        }
    }
}

/// Ordered option set. Later options override earlier ones during merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSet(pub Vec<AliasOption>);

impl OptionSet {
    /// Creates an empty option set.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an option.
    pub fn push(&mut self, option: AliasOption) {
        self.0.push(option);
    }

    /// Adds an option, builder style.
    pub fn with(mut self, option: AliasOption) -> Self {
        self.0.push(option);
        self
    }

    /// Iterates options in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &AliasOption> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&rendered.join(","))
    }
}

/// One URL template belonging to an alias, with its per-URL overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlEntry {
    /// URL template, possibly containing `{search}` placeholders.
    pub template: String,
    /// Options overriding the alias-level options for this URL only.
    #[serde(default, skip_serializing_if = "OptionSet::is_empty")]
    pub options: OptionSet,
}

impl UrlEntry {
    /// Creates an entry without options.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
            options: OptionSet::new(),
        }
    }

    /// Adds an option, builder style.
    pub fn with_option(mut self, option: AliasOption) -> Self {
        self.options.push(option);
        self
    }
}

/// A named alias mapping to one or more URL templates.
///
/// The alias store guarantees that every loaded alias has at least one URL
/// entry.
///
/// # Examples
///
/// ```
/// use webalias_core::{AliasDefinition, AliasOption, UrlEntry};
///
/// let alias = AliasDefinition::new("wiki")
///     .with_option(AliasOption::flag("dump"))
///     .with_entry(UrlEntry::new("https://en.wikipedia.org/wiki/{search}"));
///
/// assert_eq!(alias.name, "wiki");
/// assert_eq!(alias.url_entries.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasDefinition {
    /// Case-sensitive unique name.
    pub name: String,
    /// Alias-level options.
    #[serde(default, skip_serializing_if = "OptionSet::is_empty")]
    pub options: OptionSet,
    /// URL entries in declaration order.
    pub url_entries: Vec<UrlEntry>,
}

impl AliasDefinition {
    /// Creates an alias with no options and no entries.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            options: OptionSet::new(),
            url_entries: Vec::new(),
        }
    }

    /// Adds an alias-level option.
    pub fn with_option(mut self, option: AliasOption) -> Self {
        self.options.push(option);
        self
    }

    /// Adds a URL entry.
    pub fn with_entry(mut self, entry: UrlEntry) -> Self {
        self.url_entries.push(entry);
        self
    }
}

/// Kind of external viewer a handler launches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    /// Graphical browser window, spawned fire-and-forget.
    Gui,
    /// Terminal browser or pager, run inside an owned terminal session.
    Terminal,
}

impl HandlerKind {
    /// Derives the kind from a symbolic handler name (`gui1`..`gui9`,
    /// `term1`..`term7`).
    ///
    /// # Examples
    ///
    /// ```
    /// use webalias_core::HandlerKind;
    ///
    /// assert_eq!(HandlerKind::of("gui3"), Some(HandlerKind::Gui));
    /// assert_eq!(HandlerKind::of("term1"), Some(HandlerKind::Terminal));
    /// assert_eq!(HandlerKind::of("gui10"), None);
    /// assert_eq!(HandlerKind::of("lynx"), None);
    /// ```
    pub fn of(name: &str) -> Option<Self> {
        let (kind, digits, max) = if let Some(rest) = name.strip_prefix("gui") {
            (HandlerKind::Gui, rest, 9)
        } else if let Some(rest) = name.strip_prefix("term") {
            (HandlerKind::Terminal, rest, 7)
        } else {
            return None;
        };
        match digits.parse::<u8>() {
            Ok(n) if digits.len() == 1 && (1..=max).contains(&n) => Some(kind),
            _ => None,
        }
    }
}

/// The fully merged dispatch configuration for one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveConfig {
    /// Symbolic handler name (e.g. `gui1`, `term3`).
    pub handler_name: String,
    pub handler_kind: HandlerKind,
    /// Render the page as text into a pager.
    pub dump: bool,
    /// Number of pages to skip forward in the pager.
    pub dump_page_forward: u32,
}

impl EffectiveConfig {
    /// Creates a non-dump configuration for `handler_name`.
    ///
    /// Returns `None` when the name has no recognizable handler kind.
    pub fn for_handler(handler_name: &str) -> Option<Self> {
        HandlerKind::of(handler_name).map(|handler_kind| Self {
            handler_name: handler_name.to_string(),
            handler_kind,
            dump: false,
            dump_page_forward: 0,
        })
    }

    /// Renders this configuration back into the option grammar.
    ///
    /// Merging these options over the same configuration reproduces it.
    ///
    /// # Examples
    ///
    /// ```
    /// use webalias_core::EffectiveConfig;
    ///
    /// let mut config = EffectiveConfig::for_handler("term2").unwrap();
    /// config.dump = true;
    /// config.dump_page_forward = 3;
    /// assert_eq!(config.to_options().to_string(), "browser=term2,dump=3");
    /// ```
    pub fn to_options(&self) -> OptionSet {
        let mut options = OptionSet::new().with(AliasOption::with_value(
            "browser",
            &self.handler_name,
        ));
        if self.dump {
            options.push(AliasOption::with_value(
                "dump",
                &self.dump_page_forward.to_string(),
            ));
        }
        options
    }
}

/// Explicit handler/dump flags given on the command line.
///
/// Each field overrides its counterpart independently after alias and URL
/// options have been applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverride {
    /// Handler selected with `--browser`/`--term`.
    pub handler: Option<String>,
    /// `Some(page_forward)` when `--dump` was given.
    pub dump: Option<u32>,
}

impl CliOverride {
    /// Returns `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        self.handler.is_none() && self.dump.is_none()
    }
}

/// A batch of URLs to open with one handler invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAction {
    /// Substituted URLs, never empty.
    pub urls: Vec<String>,
    pub handler_name: String,
    pub handler_kind: HandlerKind,
    pub dump: bool,
    pub dump_page_forward: u32,
}

impl ResolvedAction {
    /// Starts an action for `config` holding a single URL.
    pub fn new(url: String, config: &EffectiveConfig) -> Self {
        Self {
            urls: vec![url],
            handler_name: config.handler_name.clone(),
            handler_kind: config.handler_kind,
            dump: config.dump,
            dump_page_forward: config.dump_page_forward,
        }
    }
}
