//! Tag Engine
//!
//! Builds the note's tag list from, in order: configured tags, command-line
//! tags, keyword-derived tags, and (only when all of those are empty) tokens
//! of the source URL's last path segment. Every tag carries a `#` prefix, is
//! longer than two characters without it, and appears once regardless of
//! case; the first spelling seen is kept.

use std::collections::HashSet;

use serde::Serialize;

use crate::patterns::{NON_ALPHANUMERIC, TAG_PUNCTUATION, WHITESPACE};
use crate::source::SourceLocator;

/// Prefix marking an Obsidian tag.
pub const TAG_PREFIX: char = '#';

/// Tags must be longer than this many characters, prefix excluded.
pub const MIN_TAG_CHARS: usize = 2;

/// Ordered, deduplicated, `#`-prefixed tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagSet(Vec<String>);

impl TagSet {
    /// Build a set from raw tags, applying prefixing, the length filter and
    /// case-insensitive deduplication.
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        set.extend(tags);
        set
    }

    /// Append tags not already present (case-insensitively).
    pub fn extend<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: HashSet<String> = self.0.iter().map(|t| t.to_lowercase()).collect();

        for tag in tags {
            let Some(tag) = prefixed(tag.as_ref()) else {
                continue;
            };
            if seen.insert(tag.to_lowercase()) {
                self.0.push(tag);
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Trimmed tag with a single `#` prefix, or `None` when too short.
fn prefixed(tag: &str) -> Option<String> {
    let bare = tag.trim().trim_start_matches(TAG_PREFIX).trim();
    if bare.chars().count() <= MIN_TAG_CHARS {
        return None;
    }
    Some(format!("{TAG_PREFIX}{bare}"))
}

/// Merge every tag source into a [`TagSet`].
#[must_use]
pub fn build_tags(
    config_tags: &[String],
    cli_tags: &[String],
    keywords: &[String],
    locator: &SourceLocator,
) -> TagSet {
    let mut tags = TagSet::from_tags(config_tags.iter().chain(cli_tags));
    tags.extend(keywords.iter().filter_map(|k| normalize_keyword(k)));

    if tags.is_empty() {
        let fallback = url_fallback_tags(locator);
        tracing::debug!(count = fallback.len(), "using URL-derived tags");
        tags.extend(fallback);
    }

    tags
}

/// Turn a keyword into a tag token: punctuation stripped, lowercased,
/// whitespace collapsed. Numeric-only keywords are dropped.
#[must_use]
pub fn normalize_keyword(keyword: &str) -> Option<String> {
    let lowered = keyword.to_lowercase();
    let stripped = TAG_PUNCTUATION.replace_all(&lowered, "");
    let token = WHITESPACE.replace_all(stripped.trim(), " ");
    let token = token.trim_matches('-');

    if token.is_empty() || is_numeric(token) {
        return None;
    }
    Some(token.to_string())
}

/// Tokens of the last path segment of the source.
#[must_use]
pub fn url_fallback_tags(locator: &SourceLocator) -> Vec<String> {
    let segments = locator.segments();
    let Some(last) = segments.last() else {
        return Vec::new();
    };

    NON_ALPHANUMERIC
        .split(last)
        .map(str::to_lowercase)
        .filter(|word| word.chars().count() > MIN_TAG_CHARS && !is_numeric(word))
        .collect()
}

/// Split a comma-separated command-line tag list.
#[must_use]
pub fn parse_tag_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

fn is_numeric(token: &str) -> bool {
    token.chars().all(|c| c.is_ascii_digit())
}
