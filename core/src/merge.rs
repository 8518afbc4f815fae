//! Option merging into per-URL dispatch configurations.
//!
//! Precedence, lowest first: global defaults, alias options, URL options,
//! then the command-line override applied field by field. A dump request on
//! a GUI handler is moved to the default terminal handler last, and the
//! resulting handler is validated against the [`HandlerRegistry`].
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
//!
//! let defaults = EffectiveConfig::for_handler("gui1").unwrap();
//! let merger = OptionMerger::new(defaults, "term1", CliOverride::default(), &registry, &probe);
//!
//! let alias = AliasDefinition::new("wiki")
//!     .with_option(AliasOption::flag("dump"))
//!     .with_entry(UrlEntry::new("https://en.wikipedia.org/wiki/{search}"));
//!
//! let config = merger.merge(&alias, &alias.url_entries[0]).unwrap();
//! assert!(config.dump);
//! assert_eq!(config.handler_name, "term1");
//! assert_eq!(config.handler_kind, HandlerKind::Terminal);
//! ```

use tracing::debug;

use crate::error::{ResolveError, Result};
use crate::registry::{CommandProbe, HandlerRegistry};
use crate::types::{AliasDefinition, CliOverride, EffectiveConfig, HandlerKind, OptionSet, UrlEntry};

/// Merges defaults, alias options, URL options and CLI flags.
pub struct OptionMerger<'a> {
    defaults: EffectiveConfig,
    default_terminal: String,
    cli: CliOverride,
    registry: &'a HandlerRegistry,
    probe: &'a dyn CommandProbe,
}

/// Handler/dump state before kind resolution and validation.
#[derive(Debug, Clone)]
struct Draft {
    handler: String,
    dump: bool,
    page_forward: u32,
}

impl<'a> OptionMerger<'a> {
    pub fn new(
        defaults: EffectiveConfig,
        default_terminal: &str,
        cli: CliOverride,
        registry: &'a HandlerRegistry,
        probe: &'a dyn CommandProbe,
    ) -> Self {
        Self {
            defaults,
            default_terminal: default_terminal.to_string(),
            cli,
            registry,
            probe,
        }
    }

    /// Computes the effective configuration for one URL entry of `alias`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidOption`] for a non-numeric dump page
    /// count or a valueless `browser` option, and the registry errors of
    /// [`HandlerRegistry::validate`].
    pub fn merge(&self, alias: &AliasDefinition, entry: &UrlEntry) -> Result<EffectiveConfig> {
        let draft = self.fold(alias, entry)?;
        self.finish(draft)
    }

    /// Parses the alias and URL options of one entry without resolving or
    /// validating the handler.
    ///
    /// Used where nothing will be launched, such as clipboard output.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidOption`] like [`merge`](Self::merge).
    pub fn check_options(&self, alias: &AliasDefinition, entry: &UrlEntry) -> Result<()> {
        self.fold(alias, entry).map(|_| ())
    }

    fn fold(&self, alias: &AliasDefinition, entry: &UrlEntry) -> Result<Draft> {
        let mut draft = self.draft();
        apply_options(&mut draft, &alias.name, &alias.options)?;
        apply_options(&mut draft, &alias.name, &entry.options)?;
        Ok(draft)
    }

    /// Computes the configuration used when no alias is involved (direct
    /// URLs and search fallback).
    pub fn merge_defaults(&self) -> Result<EffectiveConfig> {
        self.finish(self.draft())
    }

    fn draft(&self) -> Draft {
        Draft {
            handler: self.defaults.handler_name.clone(),
            dump: self.defaults.dump,
            page_forward: self.defaults.dump_page_forward,
        }
    }

    fn finish(&self, mut draft: Draft) -> Result<EffectiveConfig> {
        if let Some(handler) = &self.cli.handler {
            draft.handler = handler.clone();
        }
        if let Some(page_forward) = self.cli.dump {
            draft.dump = true;
            draft.page_forward = page_forward;
        }

        let mut handler_kind = HandlerKind::of(&draft.handler)
            .ok_or_else(|| ResolveError::HandlerNotConfigured(draft.handler.clone()))?;

        if draft.dump && handler_kind == HandlerKind::Gui {
            debug!(
                handler = %draft.handler,
                terminal = %self.default_terminal,
                "dump requested on GUI handler, using default terminal handler"
            );
            if HandlerKind::of(&self.default_terminal) != Some(HandlerKind::Terminal) {
                return Err(ResolveError::HandlerNotConfigured(
                    self.default_terminal.clone(),
                ));
            }
            draft.handler = self.default_terminal.clone();
            handler_kind = HandlerKind::Terminal;
        }

        self.registry.validate(&draft.handler, self.probe)?;

        Ok(EffectiveConfig {
            handler_name: draft.handler,
            handler_kind,
            dump: draft.dump,
            dump_page_forward: if draft.dump { draft.page_forward } else { 0 },
        })
    }
}

fn apply_options(draft: &mut Draft, alias: &str, options: &OptionSet) -> Result<()> {
    for option in options.iter() {
        match option.key.as_str() {
            "browser" | "handler" => match &option.value {
                Some(value) => draft.handler = value.clone(),
                None => {
                    return Err(ResolveError::InvalidOption {
                        alias: alias.to_string(),
                        key: option.key.clone(),
                        value: String::new(),
                    });
                }
            },
            "dump" => {
                draft.dump = true;
                draft.page_forward = match &option.value {
                    None => 0,
                    Some(value) => {
                        value
                            .parse::<u32>()
                            .map_err(|_| ResolveError::InvalidOption {
                                alias: alias.to_string(),
                                key: option.key.clone(),
                                value: value.clone(),
                            })?
                    }
                };
            }
            "nodump" => {
                draft.dump = false;
                draft.page_forward = 0;
            }
            other => debug!(alias, option = other, "ignoring unknown option"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::HandlerEntry;
    use crate::types::AliasOption;

    fn registry() -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();
        registry.insert("gui1", HandlerEntry::new("firefox"));
        registry.insert("gui2", HandlerEntry::new("chromium"));
        registry.insert("term1", HandlerEntry::new("w3m"));
        registry.insert("term2", HandlerEntry::new("lynx"));
        registry.insert("term3", HandlerEntry::new(""));
        registry
    }

    fn always(_: &str) -> bool {
        true
    }

    fn defaults() -> EffectiveConfig {
        EffectiveConfig::for_handler("gui1").unwrap()
    }

    fn alias(options: &[AliasOption], entry: UrlEntry) -> AliasDefinition {
        let mut alias = AliasDefinition::new("test");
        for option in options {
            alias = alias.with_option(option.clone());
        }
        alias.with_entry(entry)
    }

    fn merge_with(cli: CliOverride, alias: &AliasDefinition) -> Result<EffectiveConfig> {
        let registry = registry();
        let merger = OptionMerger::new(defaults(), "term1", cli, &registry, &always);
        merger.merge(alias, &alias.url_entries[0])
    }

    #[test]
    fn test_defaults_without_options() {
        let alias = alias(&[], UrlEntry::new("https://github.com/{search}"));
        let config = merge_with(CliOverride::default(), &alias).unwrap();
        assert_eq!(config, defaults());
    }

    #[test]
    fn test_url_options_override_alias_options() {
        let alias = alias(
            &[AliasOption::with_value("browser", "gui2")],
            UrlEntry::new("https://a").with_option(AliasOption::with_value("browser", "term2")),
        );
        let config = merge_with(CliOverride::default(), &alias).unwrap();
        assert_eq!(config.handler_name, "term2");
        assert_eq!(config.handler_kind, HandlerKind::Terminal);
    }

    #[test]
    fn test_dump_with_page_forward() {
        let alias = alias(
            &[AliasOption::with_value("browser", "term2")],
            UrlEntry::new("https://a").with_option(AliasOption::with_value("dump", "2")),
        );
        let config = merge_with(CliOverride::default(), &alias).unwrap();
        assert!(config.dump);
        assert_eq!(config.dump_page_forward, 2);
        assert_eq!(config.handler_name, "term2");
    }

    #[test]
    fn test_dump_on_gui_forces_default_terminal() {
        let alias = alias(
            &[
                AliasOption::with_value("browser", "gui2"),
                AliasOption::flag("dump"),
            ],
            UrlEntry::new("https://a"),
        );
        let config = merge_with(CliOverride::default(), &alias).unwrap();
        assert_eq!(config.handler_name, "term1");
        assert_eq!(config.dump_page_forward, 0);
    }

    #[test]
    fn test_dump_with_gui_default_terminal_not_configured() {
        let registry = registry();
        let merger =
            OptionMerger::new(defaults(), "gui2", CliOverride::default(), &registry, &always);
        let alias = alias(&[AliasOption::flag("dump")], UrlEntry::new("https://a"));
        assert_eq!(
            merger.merge(&alias, &alias.url_entries[0]).unwrap_err(),
            ResolveError::HandlerNotConfigured("gui2".into())
        );

        let plain = AliasDefinition::new("plain").with_entry(UrlEntry::new("https://a"));
        assert_eq!(merger.merge(&plain, &plain.url_entries[0]).unwrap(), defaults());
    }

    #[test]
    fn test_nodump_on_url_cancels_alias_dump() {
        let alias = alias(
            &[AliasOption::with_value("dump", "4")],
            UrlEntry::new("https://a").with_option(AliasOption::flag("nodump")),
        );
        let config = merge_with(CliOverride::default(), &alias).unwrap();
        assert!(!config.dump);
        assert_eq!(config.dump_page_forward, 0);
        assert_eq!(config.handler_name, "gui1");
    }

    #[test]
    fn test_cli_handler_wins_over_alias() {
        let alias = alias(
            &[AliasOption::with_value("browser", "term2")],
            UrlEntry::new("https://a").with_option(AliasOption::with_value("browser", "gui2")),
        );
        let cli = CliOverride {
            handler: Some("term1".into()),
            dump: None,
        };
        let config = merge_with(cli, &alias).unwrap();
        assert_eq!(config.handler_name, "term1");
        assert!(!config.dump);
    }

    #[test]
    fn test_cli_dump_only_keeps_alias_handler() {
        let alias = alias(
            &[AliasOption::with_value("browser", "term2")],
            UrlEntry::new("https://a"),
        );
        let cli = CliOverride {
            handler: None,
            dump: Some(3),
        };
        let config = merge_with(cli, &alias).unwrap();
        assert_eq!(config.handler_name, "term2");
        assert!(config.dump);
        assert_eq!(config.dump_page_forward, 3);
    }

    #[test]
    fn test_cli_gui_handler_with_alias_dump_goes_to_terminal() {
        let alias = alias(&[AliasOption::flag("dump")], UrlEntry::new("https://a"));
        let cli = CliOverride {
            handler: Some("gui2".into()),
            dump: None,
        };
        let config = merge_with(cli, &alias).unwrap();
        assert_eq!(config.handler_name, "term1");
        assert!(config.dump);
    }

    #[test]
    fn test_cli_handler_masks_bad_alias_handler() {
        let alias = alias(
            &[AliasOption::with_value("browser", "netscape")],
            UrlEntry::new("https://a"),
        );
        let cli = CliOverride {
            handler: Some("gui2".into()),
            dump: None,
        };
        assert_eq!(merge_with(cli, &alias).unwrap().handler_name, "gui2");
    }

    #[test]
    fn test_unknown_options_ignored() {
        let alias = alias(
            &[AliasOption::with_value("colour", "blue"), AliasOption::flag("fancy")],
            UrlEntry::new("https://a"),
        );
        let config = merge_with(CliOverride::default(), &alias).unwrap();
        assert_eq!(config, defaults());
    }

    #[test]
    fn test_non_numeric_page_forward_is_invalid() {
        let alias = alias(&[AliasOption::with_value("dump", "two")], UrlEntry::new("https://a"));
        assert_eq!(
            merge_with(CliOverride::default(), &alias).unwrap_err(),
            ResolveError::InvalidOption {
                alias: "test".into(),
                key: "dump".into(),
                value: "two".into(),
            }
        );
    }

    #[test]
    fn test_check_options_skips_handler_validation() {
        let registry = registry();
        let merger =
            OptionMerger::new(defaults(), "term1", CliOverride::default(), &registry, &always);
        let unknown = alias(
            &[AliasOption::with_value("browser", "gui8")],
            UrlEntry::new("https://a"),
        );
        assert!(merger.check_options(&unknown, &unknown.url_entries[0]).is_ok());

        let bad = alias(
            &[],
            UrlEntry::new("https://a").with_option(AliasOption::with_value("dump", "two")),
        );
        assert!(matches!(
            merger.check_options(&bad, &bad.url_entries[0]),
            Err(ResolveError::InvalidOption { key, .. }) if key == "dump"
        ));
    }

    #[test]
    fn test_browser_without_value_is_invalid() {
        let alias = alias(&[AliasOption::flag("browser")], UrlEntry::new("https://a"));
        assert!(matches!(
            merge_with(CliOverride::default(), &alias),
            Err(ResolveError::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_unknown_handler_not_configured() {
        let unset = alias(
            &[AliasOption::with_value("browser", "gui7")],
            UrlEntry::new("https://a"),
        );
        assert_eq!(
            merge_with(CliOverride::default(), &unset).unwrap_err(),
            ResolveError::HandlerNotConfigured("gui7".into())
        );

        let unknown = alias(
            &[AliasOption::with_value("browser", "mosaic")],
            UrlEntry::new("https://a"),
        );
        assert_eq!(
            merge_with(CliOverride::default(), &unknown).unwrap_err(),
            ResolveError::HandlerNotConfigured("mosaic".into())
        );
    }

    #[test]
    fn test_empty_registry_entry_not_configured() {
        let alias = alias(
            &[AliasOption::with_value("browser", "term3")],
            UrlEntry::new("https://a"),
        );
        assert!(matches!(
            merge_with(CliOverride::default(), &alias),
            Err(ResolveError::HandlerNotConfigured(_))
        ));
    }

    #[test]
    fn test_missing_program_not_found() {
        let registry = registry();
        let probe = |program: &str| program != "chromium";
        let merger =
            OptionMerger::new(defaults(), "term1", CliOverride::default(), &registry, &probe);
        let alias = alias(
            &[AliasOption::with_value("browser", "gui2")],
            UrlEntry::new("https://a"),
        );
        assert!(matches!(
            merger.merge(&alias, &alias.url_entries[0]),
            Err(ResolveError::HandlerNotFound { .. })
        ));
    }

    #[test]
    fn test_merge_defaults_applies_cli() {
        let registry = registry();
        let cli = CliOverride {
            handler: None,
            dump: Some(1),
        };
        let merger = OptionMerger::new(defaults(), "term1", cli, &registry, &always);
        let config = merger.merge_defaults().unwrap();
        assert_eq!(config.handler_name, "term1");
        assert!(config.dump);
        assert_eq!(config.dump_page_forward, 1);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let registry = registry();
        let configs = [
            EffectiveConfig::for_handler("gui2").unwrap(),
            EffectiveConfig::for_handler("term2").unwrap(),
            EffectiveConfig {
                handler_name: "term1".into(),
                handler_kind: HandlerKind::Terminal,
                dump: true,
                dump_page_forward: 5,
            },
        ];
        for config in configs {
            let merger = OptionMerger::new(
                config.clone(),
                "term1",
                CliOverride::default(),
                &registry,
                &always,
            );
            let mut alias = AliasDefinition::new("self").with_entry(UrlEntry::new("https://a"));
            alias.options = config.to_options();
            let merged = merger.merge(&alias, &alias.url_entries[0]).unwrap();
            assert_eq!(merged, config);
        }
    }
}
