//! Result types for capture output.
//!
//! This module defines the structured values the pipeline hands to its
//! callers: the extracted content, the resolved metadata, the exclusion
//! summary and the advisory warnings collected along the way.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata fields resolved from the original document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Author,
    PublishedAt,
    Description,
    Keywords,
    CanonicalUrl,
    SiteName,
}

impl Field {
    /// All fields in resolution order.
    pub const ALL: [Field; 7] = [
        Field::Title,
        Field::Author,
        Field::PublishedAt,
        Field::Description,
        Field::Keywords,
        Field::CanonicalUrl,
        Field::SiteName,
    ];

    /// Front matter key for this field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Author => "author",
            Field::PublishedAt => "published_at",
            Field::Description => "description",
            Field::Keywords => "keywords",
            Field::CanonicalUrl => "canonical_url",
            Field::SiteName => "site_name",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-fatal diagnostics surfaced alongside a successful capture.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Exclusion removed more than the configured share of elements.
    HighRemoval {
        ratio: f64,
        removed: usize,
        total: usize,
    },

    /// No primary content element has text left after exclusion.
    EmptyPrimaryContent,

    /// Exclusion selector was empty, unparsable or only matched protected roots.
    ExclusionSelectorFailed { selector: String, reason: String },

    /// Exclusion selector parsed but matched nothing.
    ExclusionSelectorUnmatched { selector: String },

    /// Content selector could not be parsed and was skipped.
    ContentSelectorInvalid { selector: String },

    /// A date candidate was found but could not be parsed.
    UnparsableDate { source: String, value: String },

    /// No candidate produced a value for this field.
    FieldUnresolved { field: Field },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::HighRemoval {
                ratio,
                removed,
                total,
            } => write!(
                f,
                "high removal ratio: {:.1}% of elements removed ({removed}/{total})",
                ratio * 100.0
            ),
            Warning::EmptyPrimaryContent => f.write_str(
                "primary content elements (article, main) appear to be empty after exclusions",
            ),
            Warning::ExclusionSelectorFailed { selector, reason } => {
                write!(f, "exclusion selector '{selector}' failed: {reason}")
            }
            Warning::ExclusionSelectorUnmatched { selector } => {
                write!(f, "exclusion selector '{selector}' matched no elements")
            }
            Warning::ContentSelectorInvalid { selector } => {
                write!(f, "content selector '{selector}' is not valid CSS and was skipped")
            }
            Warning::UnparsableDate { source, value } => {
                write!(f, "could not parse date '{value}' from {source}")
            }
            Warning::FieldUnresolved { field } => write!(f, "no value found for {field}"),
        }
    }
}

/// Aggregate statistics of one exclusion pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExclusionSummary {
    /// Selectors processed, valid or not.
    pub selectors_attempted: usize,

    /// Selectors that removed at least one element.
    pub selectors_matched: usize,

    /// Selectors that were empty, unparsable or only hit protected roots.
    pub selectors_failed: usize,

    /// Matched elements detached from the working tree.
    pub elements_removed: usize,

    /// Element count of the document before any removal.
    pub total_elements: usize,

    /// Removal ratio exceeded the configured threshold.
    pub high_removal: bool,

    /// Primary content elements were empty or absent after removal.
    pub empty_primary_content: bool,

    /// Wall-clock time spent filtering.
    pub elapsed_ms: u64,
}

impl ExclusionSummary {
    /// Share of the original elements that were removed (0.0 for empty documents).
    #[must_use]
    pub fn removal_ratio(&self) -> f64 {
        if self.total_elements == 0 {
            return 0.0;
        }
        self.elements_removed as f64 / self.total_elements as f64
    }
}

/// Result of content selection, created once per capture.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionResult {
    /// Selector whose match met the content threshold.
    pub selector: String,

    /// Outer HTML of the chosen element, input for Markdown conversion.
    pub html_fragment: String,

    /// Whitespace-normalized text of the chosen element.
    pub text: String,

    /// Character count of `text`.
    pub character_count: usize,

    /// Selectors tried up to and including the winner.
    pub attempted_selectors: Vec<String>,

    /// Summary of the exclusion pass that preceded selection.
    pub exclusion: ExclusionSummary,
}

/// Metadata resolved from the original document and source locator.
///
/// All fields are optional; an absent field is omitted from front matter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    /// Article title.
    pub title: Option<String>,

    /// Author name(s).
    pub author: Option<String>,

    /// Publication timestamp.
    pub published_at: Option<DateTime<Utc>>,

    /// Summary or meta description.
    pub description: Option<String>,

    /// Keywords in document order, deduplicated case-insensitively.
    pub keywords: Vec<String>,

    /// Canonical URL of the article.
    pub canonical_url: Option<String>,

    /// Publishing site name.
    pub site_name: Option<String>,
}

impl Metadata {
    /// Whether `field` holds a value.
    #[must_use]
    pub fn has(&self, field: Field) -> bool {
        match field {
            Field::Title => self.title.is_some(),
            Field::Author => self.author.is_some(),
            Field::PublishedAt => self.published_at.is_some(),
            Field::Description => self.description.is_some(),
            Field::Keywords => !self.keywords.is_empty(),
            Field::CanonicalUrl => self.canonical_url.is_some(),
            Field::SiteName => self.site_name.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_ratio_zero_elements() {
        let summary = ExclusionSummary::default();
        assert_eq!(summary.removal_ratio(), 0.0);
    }

    #[test]
    fn test_removal_ratio() {
        let summary = ExclusionSummary {
            elements_removed: 25,
            total_elements: 100,
            ..ExclusionSummary::default()
        };
        assert_eq!(summary.removal_ratio(), 0.25);
    }

    #[test]
    fn test_metadata_has() {
        let metadata = Metadata {
            title: Some("Title".to_string()),
            ..Metadata::default()
        };

        assert!(metadata.has(Field::Title));
        assert!(!metadata.has(Field::Keywords));
    }

    #[test]
    fn test_warning_display() {
        let warning = Warning::HighRemoval {
            ratio: 0.5,
            removed: 5,
            total: 10,
        };
        assert_eq!(
            warning.to_string(),
            "high removal ratio: 50.0% of elements removed (5/10)"
        );
    }
}
