//! Resolution of one invocation into dispatch actions.
//!
//! Three branches are tried in order:
//!
//! 1. **Direct URLs**: arguments that already look like URLs open with the
//!    default (or overridden) handler.
//! 2. **Aliases**: leading arguments naming aliases expand their URL
//!    templates with the remaining arguments.
//! 3. **Search**: when nothing matched, the arguments go into the search
//!    template, if searching is enabled.

use serde::Serialize;
use tracing::{debug, info};
use webalias_core::{
    CliOverride, CommandProbe, EffectiveConfig, OptionMerger, Requirement, ResolveError,
    ResolvedAction, group, substitute,
};
use webalias_db::{AliasMatch, AliasStore, Settings};

use crate::detect::UrlDetector;
use crate::error::Result;

/// Which branch produced a [`Resolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Direct,
    Alias,
    Search,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Direct => "direct",
            Mode::Alias => "alias",
            Mode::Search => "search",
        }
    }
}

/// One invocation's input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// Positional arguments, alias names first.
    pub args: Vec<String>,
    /// Consume several leading alias names instead of one.
    pub multi_alias: bool,
    /// Collect URLs for the clipboard instead of opening them.
    pub clipboard: bool,
    /// Handler and dump flags given on the command line.
    pub cli: CliOverride,
    /// Overrides the configured search-if-not-found policy.
    pub search: Option<bool>,
}

impl Request {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn multi_alias(mut self, multi_alias: bool) -> Self {
        self.multi_alias = multi_alias;
        self
    }

    pub fn clipboard(mut self, clipboard: bool) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn cli(mut self, cli: CliOverride) -> Self {
        self.cli = cli;
        self
    }

    pub fn search(mut self, search: Option<bool>) -> Self {
        self.search = search;
        self
    }
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Resolution {
    /// Actions to hand to the dispatcher, in dispatch order.
    Dispatch {
        mode: Mode,
        actions: Vec<ResolvedAction>,
    },
    /// URLs to place on the clipboard.
    Clipboard { mode: Mode, urls: Vec<String> },
    /// Nothing matched and searching is disabled.
    NotFound { name: String },
}

impl Resolution {
    /// Branch that produced this resolution, if any.
    pub fn mode(&self) -> Option<Mode> {
        match self {
            Resolution::Dispatch { mode, .. } | Resolution::Clipboard { mode, .. } => Some(*mode),
            Resolution::NotFound { .. } => None,
        }
    }
}

/// Turns [`Request`]s into [`Resolution`]s against a loaded store and
/// settings.
///
/// The resolver never spawns anything; pass the result to a
/// [`Dispatcher`](crate::Dispatcher).
///
/// # Examples
///
/// ```
/// use webalias_db::{AliasStore, Settings};
/// use webalias_resolver::{Mode, Request, Resolution, Resolver};
///
/// let store = AliasStore::builder()
///     .from_text("inline", "gh https://github.com/{search}\n")
///     .build()
///     .unwrap();
/// let settings = Settings::default();
/// let probe = |_: &str| true;
/// let resolver = Resolver::new(&store, &settings, &probe).unwrap();
///
/// let resolution = resolver.resolve(&Request::new(["gh", "golang/go"])).unwrap();
/// let Resolution::Dispatch { mode, actions } = resolution else { panic!() };
/// assert_eq!(mode, Mode::Alias);
/// assert_eq!(actions[0].handler_name, "gui1");
/// assert_eq!(actions[0].urls, vec!["https://github.com/golang/go"]);
/// ```
pub struct Resolver<'a> {
    store: &'a AliasStore,
    settings: &'a Settings,
    probe: &'a dyn CommandProbe,
    detector: UrlDetector,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pattern`](crate::Error::Pattern) if the configured
    /// TLD list cannot be compiled.
    pub fn new(
        store: &'a AliasStore,
        settings: &'a Settings,
        probe: &'a dyn CommandProbe,
    ) -> Result<Self> {
        Ok(Self {
            store,
            settings,
            probe,
            detector: UrlDetector::new(&settings.tlds)?,
        })
    }

    /// Resolves one invocation.
    ///
    /// # Errors
    ///
    /// Fails on the first option, handler or placeholder error; nothing is
    /// returned for partial success.
    pub fn resolve(&self, request: &Request) -> Result<Resolution> {
        let urls = self.detector.extract(&request.args.join(" "));
        if !urls.is_empty() {
            return self.resolve_direct(urls, request);
        }

        match self.store.resolve(&request.args, request.multi_alias) {
            Some(found) => self.resolve_aliases(found, request),
            None if request.multi_alias => {
                Err(ResolveError::NoAliasesFound(request.args.join(" ")).into())
            }
            None if request.search.unwrap_or(self.settings.search_if_not_found) => {
                self.resolve_search(request)
            }
            None => {
                let name = request.args.first().cloned().unwrap_or_default();
                info!(%name, "alias not found");
                Ok(Resolution::NotFound { name })
            }
        }
    }

    fn resolve_direct(&self, urls: Vec<String>, request: &Request) -> Result<Resolution> {
        if request.clipboard {
            return Err(ResolveError::IncompatibleOptions(
                "clipboard output cannot be combined with direct URLs".to_string(),
            )
            .into());
        }
        let config = self.merger(&request.cli)?.merge_defaults()?;
        Ok(Resolution::Dispatch {
            mode: Mode::Direct,
            actions: group(with_config(urls, &config)),
        })
    }

    fn resolve_aliases(&self, found: AliasMatch<'_>, request: &Request) -> Result<Resolution> {
        debug!(
            aliases = found.consumed,
            remaining = found.remaining.len(),
            "resolving aliases"
        );

        let merger = self.merger(&request.cli)?;
        if request.clipboard {
            let mut urls = Vec::new();
            for alias in &found.aliases {
                for entry in &alias.url_entries {
                    merger.check_options(alias, entry)?;
                    urls.push(substitute(
                        &entry.template,
                        &found.remaining,
                        Requirement::Optional,
                    )?);
                }
            }
            return Ok(Resolution::Clipboard {
                mode: Mode::Alias,
                urls,
            });
        }

        let mut resolved = Vec::new();
        for alias in &found.aliases {
            for entry in &alias.url_entries {
                let config = merger.merge(alias, entry)?;
                let url = substitute(&entry.template, &found.remaining, Requirement::Optional)?;
                resolved.push((url, config));
            }
        }
        Ok(Resolution::Dispatch {
            mode: Mode::Alias,
            actions: group(resolved),
        })
    }

    fn resolve_search(&self, request: &Request) -> Result<Resolution> {
        let url = substitute(
            &self.settings.search_template,
            &request.args,
            Requirement::Required,
        )?;
        debug!(%url, "falling back to search");

        if request.clipboard {
            return Ok(Resolution::Clipboard {
                mode: Mode::Search,
                urls: vec![url],
            });
        }
        let config = self.merger(&request.cli)?.merge_defaults()?;
        Ok(Resolution::Dispatch {
            mode: Mode::Search,
            actions: group(with_config(vec![url], &config)),
        })
    }

    fn merger(&self, cli: &CliOverride) -> Result<OptionMerger<'a>> {
        let defaults = self.settings.default_config().ok_or_else(|| {
            ResolveError::HandlerNotConfigured(self.settings.default_handler.clone())
        })?;
        Ok(OptionMerger::new(
            defaults,
            &self.settings.default_terminal,
            cli.clone(),
            &self.settings.handlers,
            self.probe,
        ))
    }
}

fn with_config(urls: Vec<String>, config: &EffectiveConfig) -> Vec<(String, EffectiveConfig)> {
    urls.into_iter().map(|url| (url, config.clone())).collect()
}
