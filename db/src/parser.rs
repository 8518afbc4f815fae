//! Line-oriented alias source grammar.
//!
//! ```text
//! # comment
//! gh  https://github.com/{search}
//! wiki<>dump
//!     https://en.wikipedia.org/wiki/{search}
//! news<>browser=gui2
//!     https://news.ycombinator.com <|> https://lobste.rs<>browser=term1<>dump+2
//! ```
//!
//! A header starts in column 0 with the alias name and its `<>`-separated
//! options, optionally followed by URL entries on the same line. Indented
//! lines add URL entries to the most recent header. Entries on one line are
//! separated by `<|>`; each entry carries its own `<>` options.

use webalias_core::{AliasDefinition, AliasOption, OptionSet, UrlEntry};

use crate::error::{ParseError, ParseErrorKind};

/// Marker introducing an option.
pub const OPTION_MARKER: &str = "<>";

/// Marker separating URL entries on one line.
pub const ENTRY_SEPARATOR: &str = "<|>";

/// Alias source text with a name used in error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasSource {
    pub name: String,
    pub text: String,
}

impl AliasSource {
    pub fn new(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            text: text.to_string(),
        }
    }
}

/// An alias together with the line its header was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAlias {
    pub definition: AliasDefinition,
    pub line: usize,
}

/// Parses one source into aliases in declaration order.
///
/// Duplicate detection is left to the caller, which sees every source.
///
/// # Errors
///
/// Returns a [`ParseError`] for the first syntax problem found.
///
/// # Examples
///
/// ```
/// use webalias_db::{AliasSource, parse_source};
///
/// let text = "wiki<>dump\n    https://en.wikipedia.org/wiki/{search}\n";
/// let source = AliasSource::new("inline", text);
/// let aliases = parse_source(&source).unwrap();
/// assert_eq!(aliases.len(), 1);
/// assert_eq!(aliases[0].definition.name, "wiki");
/// assert_eq!(aliases[0].definition.options.to_string(), "dump");
/// ```
pub fn parse_source(source: &AliasSource) -> Result<Vec<ParsedAlias>, ParseError> {
    let mut parsed = Vec::new();
    let mut current: Option<ParsedAlias> = None;

    let error = |line: usize, alias: Option<&str>, kind: ParseErrorKind| ParseError {
        origin: source.name.clone(),
        line,
        alias: alias.map(String::from),
        kind,
    };

    for (idx, raw) in source.text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if raw.starts_with([' ', '\t']) {
            let Some(alias) = current.as_mut() else {
                return Err(error(line, None, ParseErrorKind::OrphanEntry));
            };
            let entries = parse_entries(trimmed)
                .map_err(|kind| error(line, Some(&alias.definition.name), kind))?;
            alias.definition.url_entries.extend(entries);
            continue;
        }

        if let Some(done) = current.take() {
            parsed.push(finish(done, &error)?);
        }

        let (head, tail) = match trimmed.split_once(char::is_whitespace) {
            Some((head, tail)) => (head, tail.trim()),
            None => (trimmed, ""),
        };
        let (name, options) = split_options(head).map_err(|kind| error(line, None, kind))?;
        if name.is_empty() {
            return Err(error(line, None, ParseErrorKind::EmptyName));
        }

        let mut definition = AliasDefinition::new(name);
        definition.options = options;
        if !tail.is_empty() {
            let entries = parse_entries(tail).map_err(|kind| error(line, Some(name), kind))?;
            definition.url_entries.extend(entries);
        }
        current = Some(ParsedAlias { definition, line });
    }

    if let Some(done) = current.take() {
        parsed.push(finish(done, &error)?);
    }

    Ok(parsed)
}

fn finish(
    alias: ParsedAlias,
    error: &impl Fn(usize, Option<&str>, ParseErrorKind) -> ParseError,
) -> Result<ParsedAlias, ParseError> {
    if alias.definition.url_entries.is_empty() {
        return Err(error(
            alias.line,
            Some(&alias.definition.name),
            ParseErrorKind::NoUrlEntries,
        ));
    }
    Ok(alias)
}

fn parse_entries(text: &str) -> Result<Vec<UrlEntry>, ParseErrorKind> {
    text.split(ENTRY_SEPARATOR)
        .map(|part| {
            let part = part.trim();
            if part.is_empty() {
                return Err(ParseErrorKind::EmptyEntry);
            }
            let (template, options) = split_options(part)?;
            if template.is_empty() {
                return Err(ParseErrorKind::EmptyEntry);
            }
            Ok(UrlEntry {
                template: template.to_string(),
                options,
            })
        })
        .collect()
}

/// Splits `base<>opt<>opt` into the base text and its options.
fn split_options(text: &str) -> Result<(&str, OptionSet), ParseErrorKind> {
    let mut parts = text.split(OPTION_MARKER);
    let base = parts.next().unwrap_or_default().trim();
    if base.contains('<') {
        return Err(ParseErrorKind::UnterminatedOptions);
    }

    let rest: Vec<&str> = parts.collect();
    let mut options = OptionSet::new();
    for (i, raw) in rest.iter().enumerate() {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(if i + 1 == rest.len() {
                ParseErrorKind::UnterminatedOptions
            } else {
                ParseErrorKind::MalformedOption(String::new())
            });
        }
        if raw.contains('<') {
            return Err(ParseErrorKind::UnterminatedOptions);
        }
        options.push(parse_option(raw)?);
    }
    Ok((base, options))
}

/// Parses `key`, `key=value` or `key+value`.
fn parse_option(text: &str) -> Result<AliasOption, ParseErrorKind> {
    let malformed = || ParseErrorKind::MalformedOption(text.to_string());

    let split = text.split_once('=').or_else(|| text.split_once('+'));
    let (key, value) = match split {
        Some((key, value)) => (key, Some(value)),
        None => (text, None),
    };

    let mut chars = key.chars();
    let key_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !key_ok {
        return Err(malformed());
    }

    match value {
        Some(value) if value.is_empty() || value.contains(char::is_whitespace) => Err(malformed()),
        Some(value) => Ok(AliasOption::with_value(key, value)),
        None => Ok(AliasOption::flag(key)),
    }
}
