//! Direct URL detection in command-line text.
//!
//! Text is scanned token by token. A token counts as a URL when it carries
//! one of the recognized schemes, starts with `www.`, or is a host ending in
//! a configured top-level domain, optionally followed by a path, port, query
//! or fragment. Tokens are returned exactly as written.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;
use url::Url;

use crate::error::Result;

static SCHEME_REGEX: OnceLock<Regex> = OnceLock::new();

fn scheme_regex() -> &'static Regex {
    SCHEME_REGEX.get_or_init(|| {
        Regex::new(r"^(?i:https?|ftp|file)://\S*$").expect("Failed to compile scheme regex")
    })
}

/// Finds literal URLs among whitespace-separated tokens.
///
/// # Examples
///
/// ```
/// use webalias_resolver::UrlDetector;
///
/// let detector = UrlDetector::new(&["com".to_string(), "org".to_string()]).unwrap();
/// let urls = detector.extract("open https://example.com/x and example.org/y or golang/go");
/// assert_eq!(urls, vec!["https://example.com/x", "example.org/y"]);
/// ```
#[derive(Debug, Clone)]
pub struct UrlDetector {
    tld: Option<Regex>,
}

impl UrlDetector {
    /// Builds a detector recognizing hosts ending in one of `tlds`.
    ///
    /// An empty list disables bare-host detection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pattern`](crate::Error::Pattern) if the combined
    /// pattern cannot be compiled.
    pub fn new(tlds: &[String]) -> Result<Self> {
        let alternatives: Vec<String> = tlds
            .iter()
            .map(|tld| tld.trim().trim_start_matches('.'))
            .filter(|tld| !tld.is_empty())
            .map(regex::escape)
            .collect();

        let tld = if alternatives.is_empty() {
            None
        } else {
            let pattern = format!(
                r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+(?i:{})(?:[/:?#]\S*)?$",
                alternatives.join("|")
            );
            Some(Regex::new(&pattern)?)
        };

        Ok(Self { tld })
    }

    /// Returns `true` if `token` is a literal URL.
    pub fn is_url(&self, token: &str) -> bool {
        if scheme_regex().is_match(token) {
            return Url::parse(token).is_ok();
        }
        if token.len() > 4 && token.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("www.")) {
            return true;
        }
        self.tld.as_ref().is_some_and(|re| re.is_match(token))
    }

    /// Extracts every URL token of `text` in order.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let urls: Vec<String> = text
            .split_whitespace()
            .filter(|token| self.is_url(token))
            .map(String::from)
            .collect();
        if !urls.is_empty() {
            debug!(count = urls.len(), "found direct URLs");
        }
        urls
    }
}
