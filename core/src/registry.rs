//! Handler registry: symbolic handler names mapped to command lines.
//!
//! Entries deserialize either from a plain command string or from a map with
//! an optional post-run command:
//!
//! ```yaml
//! gui1: firefox
//! term1:
//!   command: w3m
//!   after: clear
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ResolveError, Result};

/// Answers whether a program can be invoked.
///
/// Implemented for any `Fn(&str) -> bool`, which keeps tests free of real
/// process probing.
pub trait CommandProbe {
    fn command_exists(&self, program: &str) -> bool;
}

impl<F> CommandProbe for F
where
    F: Fn(&str) -> bool,
{
    fn command_exists(&self, program: &str) -> bool {
        self(program)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawHandlerEntry {
    Command(String),
    Detailed {
        command: String,
        #[serde(default)]
        after: Option<String>,
    },
}

/// Command line for one handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawHandlerEntry")]
pub struct HandlerEntry {
    /// Command line; empty means "not configured".
    pub command: String,
    /// Command chained after the handler's terminal session exits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl From<RawHandlerEntry> for HandlerEntry {
    fn from(raw: RawHandlerEntry) -> Self {
        match raw {
            RawHandlerEntry::Command(command) => Self {
                command,
                after: None,
            },
            RawHandlerEntry::Detailed { command, after } => Self { command, after },
        }
    }
}

impl HandlerEntry {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            after: None,
        }
    }

    /// Sets the post-run command.
    pub fn with_after(mut self, after: &str) -> Self {
        self.after = Some(after.to_string());
        self
    }

    /// Returns the program (first shell word) of the command line.
    pub fn program(&self) -> Option<String> {
        shell_words::split(&self.command)
            .ok()
            .and_then(|words| words.into_iter().next())
    }
}

/// Map from symbolic handler name to its command line.
///
/// # Examples
///
/// ```
/// use webalias_core::{HandlerEntry, HandlerRegistry, ResolveError};
///
/// let mut registry = HandlerRegistry::new();
/// registry.insert("gui1", HandlerEntry::new("firefox --new-tab"));
/// registry.insert("term1", HandlerEntry::new(""));
///
/// let probe = |program: &str| program == "firefox";
/// assert!(registry.validate("gui1", &probe).is_ok());
/// assert!(matches!(
///     registry.validate("term1", &probe),
///     Err(ResolveError::HandlerNotConfigured(_))
/// ));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerRegistry {
    entries: BTreeMap<String, HandlerEntry>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for `name`.
    pub fn insert(&mut self, name: &str, entry: HandlerEntry) {
        self.entries.insert(name.to_string(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&HandlerEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks that `name` is configured and its program is invocable.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::HandlerNotConfigured`] if there is no entry or
    /// its command is blank, and [`ResolveError::HandlerNotFound`] if the
    /// probe cannot find the program.
    pub fn validate(&self, name: &str, probe: &dyn CommandProbe) -> Result<&HandlerEntry> {
        let entry = self
            .entries
            .get(name)
            .filter(|entry| !entry.command.trim().is_empty())
            .ok_or_else(|| ResolveError::HandlerNotConfigured(name.to_string()))?;
        let program = entry
            .program()
            .ok_or_else(|| ResolveError::HandlerNotConfigured(name.to_string()))?;
        if !probe.command_exists(&program) {
            return Err(ResolveError::HandlerNotFound {
                handler: name.to_string(),
                command: program,
            });
        }
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always(_: &str) -> bool {
        true
    }

    fn never(_: &str) -> bool {
        false
    }

    #[test]
    fn test_entry_from_plain_string() {
        let entry: HandlerEntry = serde_json::from_str(r#""w3m -N""#).unwrap();
        assert_eq!(entry.command, "w3m -N");
        assert_eq!(entry.after, None);
    }

    #[test]
    fn test_entry_from_map() {
        let entry: HandlerEntry =
            serde_json::from_str(r#"{"command": "lynx", "after": "clear"}"#).unwrap();
        assert_eq!(entry.command, "lynx");
        assert_eq!(entry.after.as_deref(), Some("clear"));
    }

    #[test]
    fn test_program_handles_quoting() {
        let entry = HandlerEntry::new("'/opt/My Browser/bin' --private");
        assert_eq!(entry.program().as_deref(), Some("/opt/My Browser/bin"));
    }

    #[test]
    fn test_validate_missing_entry() {
        let registry = HandlerRegistry::new();
        assert_eq!(
            registry.validate("gui4", &always).unwrap_err(),
            ResolveError::HandlerNotConfigured("gui4".into())
        );
    }

    #[test]
    fn test_validate_blank_command() {
        let mut registry = HandlerRegistry::new();
        registry.insert("gui2", HandlerEntry::new("   "));
        assert!(matches!(
            registry.validate("gui2", &always),
            Err(ResolveError::HandlerNotConfigured(_))
        ));
    }

    #[test]
    fn test_validate_missing_program() {
        let mut registry = HandlerRegistry::new();
        registry.insert("term2", HandlerEntry::new("elinks -no-home"));
        assert_eq!(
            registry.validate("term2", &never).unwrap_err(),
            ResolveError::HandlerNotFound {
                handler: "term2".into(),
                command: "elinks".into(),
            }
        );
    }

    #[test]
    fn test_registry_deserializes_mixed_entries() {
        let registry: HandlerRegistry = serde_json::from_str(
            r#"{"gui1": "firefox", "term1": {"command": "w3m", "after": "clear"}}"#,
        )
        .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("gui1").unwrap().command, "firefox");
        assert_eq!(
            registry.get("term1").unwrap().after.as_deref(),
            Some("clear")
        );
    }
}
