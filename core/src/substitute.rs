//! Search placeholder expansion for URL templates.
//!
//! A template marks where the user's remaining arguments go with one of the
//! placeholder tokens:
//!
//! - `{search}`: arguments joined with a space (emitted as `%20`)
//! - `{search\+}` or `{search+}`: arguments joined with a literal `+`
//!
//! Characters outside the URL-safe set are percent-encoded per UTF-8 byte.
//! A character preceded by a double backslash (`\\&`) is inserted literally
//! with the backslashes stripped.
//!
//! # Example
//!
//! ```
//! use webalias_core::{Requirement, substitute};
//!
//! let args = vec!["rust lang".to_string(), "a&b".to_string()];
//! let url =
//!     substitute("https://example.com/?q={search\\+}", &args, Requirement::Required).unwrap();
//! assert_eq!(url, "https://example.com/?q=rust%20lang+a%26b");
//! ```

use crate::error::{ResolveError, Result};

/// Placeholder joining arguments with a space.
pub const SEARCH_PLACEHOLDER: &str = "{search}";

/// Placeholders joining arguments with `+`.
pub const PLUS_PLACEHOLDERS: [&str; 2] = ["{search\\+}", "{search+}"];

/// Whether a template must receive search terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Templates without a placeholder pass through unchanged and an empty
    /// argument list expands to nothing.
    Optional,
    /// The template must contain a placeholder and there must be at least
    /// one argument.
    Required,
}

/// Returns `true` if `template` contains any search placeholder.
pub fn has_placeholder(template: &str) -> bool {
    template.contains(SEARCH_PLACEHOLDER) || PLUS_PLACEHOLDERS.iter().any(|p| template.contains(p))
}

/// Expands every search placeholder in `template` with `args`.
///
/// # Errors
///
/// With [`Requirement::Required`], returns
/// [`ResolveError::MalformedTemplate`] if the template has no placeholder
/// and [`ResolveError::EmptyQuery`] if `args` is empty.
///
/// # Examples
///
/// ```
/// use webalias_core::{Requirement, ResolveError, substitute};
///
/// let args = vec!["golang/go".to_string()];
/// assert_eq!(
///     substitute("https://github.com/{search}", &args, Requirement::Optional).unwrap(),
///     "https://github.com/golang/go"
/// );
///
/// // Static templates are fine unless a query is mandatory.
/// assert_eq!(
///     substitute("https://lobste.rs", &args, Requirement::Optional).unwrap(),
///     "https://lobste.rs"
/// );
/// assert!(matches!(
///     substitute("https://lobste.rs", &args, Requirement::Required),
///     Err(ResolveError::MalformedTemplate(_))
/// ));
/// ```
pub fn substitute(template: &str, args: &[String], requirement: Requirement) -> Result<String> {
    if !has_placeholder(template) {
        return match requirement {
            Requirement::Required => Err(ResolveError::MalformedTemplate(template.to_string())),
            Requirement::Optional => Ok(template.to_string()),
        };
    }
    if args.is_empty() && requirement == Requirement::Required {
        return Err(ResolveError::EmptyQuery(template.to_string()));
    }

    let mut expanded = template.to_string();
    if expanded.contains(SEARCH_PLACEHOLDER) {
        expanded = expanded.replace(SEARCH_PLACEHOLDER, &encode_query(args, "%20"));
    }
    for placeholder in PLUS_PLACEHOLDERS {
        if expanded.contains(placeholder) {
            expanded = expanded.replace(placeholder, &encode_query(args, "+"));
        }
    }
    Ok(expanded)
}

fn encode_query(args: &[String], delimiter: &str) -> String {
    args.iter()
        .map(|arg| encode_argument(arg))
        .collect::<Vec<_>>()
        .join(delimiter)
}

/// Percent-encodes one argument, honoring `\\x` literal escapes.
fn encode_argument(arg: &str) -> String {
    let chars: Vec<char> = arg.chars().collect();
    let mut out = String::with_capacity(arg.len() * 3);
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if ch == '\\' && chars.get(i + 1) == Some(&'\\') {
            if let Some(&literal) = chars.get(i + 2) {
                out.push(literal);
                i += 3;
                continue;
            }
        }
        push_encoded(&mut out, ch);
        i += 1;
    }
    out
}

fn push_encoded(out: &mut String, ch: char) {
    if is_url_safe(ch) {
        out.push(ch);
        return;
    }
    let mut buf = [0u8; 4];
    for byte in ch.encode_utf8(&mut buf).bytes() {
        out.push_str(&format!("%{byte:02X}"));
    }
}

/// Unreserved characters plus the path-safe sub-delimiters.
///
/// `&`, `+`, `=`, `?` and `#` are excluded because they carry meaning inside
/// query strings.
fn is_url_safe(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(
            ch,
            '-' | '.' | '_' | '~' | '/' | ':' | '@' | '!' | '$' | '\'' | '(' | ')' | '*' | ',' | ';'
        )
}
