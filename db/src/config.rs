//! User configuration for handlers, defaults and alias sources.
//!
//! Defines the YAML-serializable settings file. Every field is optional;
//! missing fields take the values of [`Settings::default`].
//!
//! # Example YAML
//!
//! ```yaml
//! handlers:
//!   gui1: firefox
//!   gui2: chromium --incognito
//!   term1: w3m
//!   term2:
//!     command: lynx
//!     after: clear
//! default_handler: gui1
//! default_terminal: term1
//! search_template: "https://duckduckgo.com/?q={search\\+}"
//! search_if_not_found: true
//! tlds: [com, org, net, io]
//! aliases:
//!   - aliases
//!   - aliases.d
//! terminal: "xterm -T {title} -e sh -c {command}"
//! clipboard: "xclip -selection clipboard"
//! dump:
//!   flag: -dump
//!   pager: less
//!   page_lines: 24
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use webalias_core::{EffectiveConfig, HandlerEntry, HandlerRegistry};

use crate::error::Result;
use crate::loader::StoreBuilder;

/// Directory name under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "webalias";

/// Settings file name inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.yml";

/// How dump-mode pages are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DumpConfig {
    /// Flag making the terminal handler print the page as text.
    pub flag: String,
    /// Pager receiving the dumped text.
    pub pager: String,
    /// Lines per page used to translate a page-forward count.
    pub page_lines: u32,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            flag: "-dump".to_string(),
            pager: "less".to_string(),
            page_lines: 24,
        }
    }
}

/// Top-level configuration.
///
/// # Examples
///
/// ```
/// use webalias_db::Settings;
///
/// let settings: Settings = serde_yaml::from_str("default_handler: gui2\n").unwrap();
/// assert_eq!(settings.default_handler, "gui2");
/// // Unset fields keep their defaults.
/// assert_eq!(settings.default_terminal, "term1");
/// assert!(settings.search_if_not_found);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Symbolic handler name to command line.
    pub handlers: HandlerRegistry,
    /// Handler used when nothing else selects one.
    pub default_handler: String,
    /// Terminal handler substituted when dump is requested on a GUI handler.
    pub default_terminal: String,
    /// Template for search fallback; must contain a search placeholder.
    pub search_template: String,
    /// Search the arguments when no alias matches.
    pub search_if_not_found: bool,
    /// Top-level domains recognized for scheme-less direct URLs.
    pub tlds: Vec<String>,
    /// Alias files or directories, relative to the config file.
    pub aliases: Vec<PathBuf>,
    /// Terminal emulator template with `{title}` and `{command}` placeholders.
    pub terminal: String,
    /// Command receiving clipboard text on stdin.
    pub clipboard: String,
    pub dump: DumpConfig,
}

impl Default for Settings {
    fn default() -> Self {
        let mut handlers = HandlerRegistry::new();
        handlers.insert("gui1", HandlerEntry::new("firefox"));
        handlers.insert("term1", HandlerEntry::new("w3m"));

        Self {
            handlers,
            default_handler: "gui1".to_string(),
            default_terminal: "term1".to_string(),
            search_template: "https://duckduckgo.com/?q={search\\+}".to_string(),
            search_if_not_found: true,
            tlds: ["com", "org", "net", "io", "dev", "de", "uk"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            aliases: vec![PathBuf::from("aliases")],
            terminal: "xterm -T {title} -e sh -c {command}".to_string(),
            clipboard: "xclip -selection clipboard".to_string(),
            dump: DumpConfig::default(),
        }
    }
}

impl Settings {
    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DatabaseError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::DatabaseError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let settings = serde_yaml::from_reader(reader)?;
        Ok(settings)
    }

    /// Loads settings from `path`, or returns the defaults if it does not
    /// exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "no settings file, using defaults");
            Ok(Self::default())
        }
    }

    /// Saves the settings as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DatabaseError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::DatabaseError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Default settings path, `<config dir>/webalias/config.yml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Resolves [`aliases`](Self::aliases) against the directory holding the
    /// settings file. Absolute entries are kept as they are.
    pub fn alias_paths(&self, settings_path: &Path) -> Vec<PathBuf> {
        let base = settings_path.parent().unwrap_or_else(|| Path::new("."));
        self.aliases
            .iter()
            .map(|path| {
                if path.is_absolute() {
                    path.clone()
                } else {
                    base.join(path)
                }
            })
            .collect()
    }

    /// Returns a store builder over the configured alias paths that exist.
    pub fn store_builder(&self, settings_path: &Path) -> StoreBuilder {
        self.alias_paths(settings_path)
            .into_iter()
            .fold(StoreBuilder::new(), |builder, path| {
                builder.from_path_if_exists(path)
            })
    }

    /// Default dispatch configuration, or `None` if
    /// [`default_handler`](Self::default_handler) is not a handler name.
    pub fn default_config(&self) -> Option<EffectiveConfig> {
        EffectiveConfig::for_handler(&self.default_handler)
    }
}
