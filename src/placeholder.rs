//! Literal token substitution.
//!
//! [`substitute`] replaces every occurrence of each token in a single
//! left-to-right scan of the input. Text produced by one replacement is never
//! scanned again, so a replacement value that happens to contain another
//! token is emitted verbatim.

use crate::manifest::{ManifestRecord, UNKNOWN};
use regex::Regex;
use std::borrow::Cow;

/// An ordered sequence of `(token, replacement)` pairs.
///
/// When two tokens could match at the same position, the one added first
/// wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    pairs: Vec<(String, String)>,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append.
    pub fn with(mut self, token: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.push(token, replacement);
        self
    }

    pub fn push(&mut self, token: impl Into<String>, replacement: impl Into<String>) {
        self.pairs.push((token.into(), replacement.into()));
    }

    /// Append every pair of `other` after the pairs already present.
    pub fn extend(&mut self, other: &PlaceholderMap) {
        self.pairs.extend(other.pairs.iter().cloned());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(t, r)| (t.as_str(), r.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn replacement_for(&self, token: &str) -> Option<&str> {
        self.pairs.iter().find(|(t, _)| t == token).map(|(_, r)| r.as_str())
    }
}

impl<T: Into<String>, R: Into<String>> FromIterator<(T, R)> for PlaceholderMap {
    fn from_iter<I: IntoIterator<Item = (T, R)>>(iter: I) -> Self {
        let mut map = PlaceholderMap::new();
        for (token, replacement) in iter {
            map.push(token, replacement);
        }
        map
    }
}

/// Replace every literal occurrence of each token of `map` in `text`.
///
/// Unmatched tokens are ignored and empty tokens are skipped.
///
/// ```
/// use assetforge::placeholder::{substitute, PlaceholderMap};
///
/// let map = PlaceholderMap::new()
///     .with("##VERSION##", "1.2.10")
///     .with("##AUTHOR##", "A");
/// assert_eq!(substitute("v##VERSION## by ##AUTHOR##", &map), "v1.2.10 by A");
/// ```
pub fn substitute(text: &str, map: &PlaceholderMap) -> String {
    if map.is_empty() {
        return text.to_string();
    }

    let tokens: Vec<String> = map
        .iter()
        .filter(|(token, _)| !token.is_empty())
        .map(|(token, _)| regex::escape(token))
        .collect();
    if tokens.is_empty() {
        return text.to_string();
    }

    // Escaped literals only, so this cannot fail in practice.
    let pattern = match Regex::new(&tokens.join("|")) {
        Ok(re) => re,
        Err(_) => return text.to_string(),
    };

    let replaced: Cow<'_, str> = pattern.replace_all(text, |caps: &regex::Captures<'_>| {
        let token = &caps[0];
        map.replacement_for(token).unwrap_or(token).to_string()
    });
    replaced.into_owned()
}

/// Manifest tokens filled in the markup shell.
pub fn markup_tokens(record: &ManifestRecord) -> PlaceholderMap {
    let or_unknown = |value: Option<&str>| value.unwrap_or(UNKNOWN).to_string();
    PlaceholderMap::new()
        .with("##TITLE##", or_unknown(record.title()))
        .with("##DESCRIPTION##", or_unknown(record.description()))
        .with("##AUTHOR##", or_unknown(record.author()))
        .with("##REPOSITORY##", or_unknown(record.repository()))
        .with("##VERSION##", or_unknown(record.version_text()))
}

/// Manifest tokens filled in the documentation: the markup tokens plus the
/// package name and the last build date.
pub fn docs_tokens(record: &ManifestRecord) -> PlaceholderMap {
    let or_unknown = |value: Option<&str>| value.unwrap_or(UNKNOWN).to_string();
    markup_tokens(record)
        .with("##NAME##", or_unknown(record.name()))
        .with("##DATE##", or_unknown(record.last_build_date_utc()))
}
