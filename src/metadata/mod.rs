//! Metadata Resolver
//!
//! Resolves title, author, publication date, description, keywords,
//! canonical URL and site name from the original, unfiltered document plus
//! the source locator. Every field has a fixed candidate chain (see
//! [`sources`]); the first candidate with a non-empty value wins. A missing
//! field is a valid outcome and only produces a [`Warning::FieldUnresolved`].

pub mod dates;
pub mod json_ld;
pub mod meta_tags;
pub mod sources;

use std::collections::HashSet;

use crate::dom::{self, Document, Selection};
use crate::patterns::KEYWORD_DELIMITER;
use crate::result::{Field, Metadata, Warning};
use crate::source::SourceLocator;

pub use dates::parse_date;
pub use sources::{clean_metadata_text, Source, SourceContext};

use sources::{
    AUTHOR_SOURCES, CANONICAL_URL_SOURCES, DATE_SOURCES, DESCRIPTION_SOURCES, KEYWORD_ELEMENTS,
    MAX_KEYWORD_ELEMENTS, SITE_NAME_SOURCES, TITLE_SOURCES,
};

/// A value found for a field, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub field: Field,
    pub source: Source,
    pub value: String,
}

/// Every non-empty candidate of every field, in priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataCandidateSet {
    pub candidates: Vec<Candidate>,
}

impl MetadataCandidateSet {
    /// Candidates for one field, highest priority first.
    pub fn for_field(&self, field: Field) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(move |c| c.field == field)
    }

    /// Highest-priority candidate of a field.
    #[must_use]
    pub fn first(&self, field: Field) -> Option<&Candidate> {
        self.for_field(field).next()
    }
}

/// Candidate chain of a single-valued field.
#[must_use]
pub fn chain(field: Field) -> &'static [Source] {
    match field {
        Field::Title => TITLE_SOURCES,
        Field::Author => AUTHOR_SOURCES,
        Field::PublishedAt => DATE_SOURCES,
        Field::Description => DESCRIPTION_SOURCES,
        Field::CanonicalUrl => CANONICAL_URL_SOURCES,
        Field::SiteName => SITE_NAME_SOURCES,
        Field::Keywords => &[],
    }
}

/// Evaluate every source of every single-valued field.
///
/// Unlike [`resolve_metadata`], nothing is skipped; useful for explaining
/// why a field resolved the way it did.
#[must_use]
pub fn collect_candidates(doc: &Document, locator: &SourceLocator) -> MetadataCandidateSet {
    let ctx = SourceContext::new(doc, locator);
    let candidates = Field::ALL
        .iter()
        .flat_map(|&field| {
            let ctx = &ctx;
            chain(field).iter().filter_map(move |source| {
                source.extract(ctx).map(|value| Candidate {
                    field,
                    source: *source,
                    value,
                })
            })
        })
        .collect();

    MetadataCandidateSet { candidates }
}

/// Resolve all metadata fields.
#[must_use]
pub fn resolve_metadata(
    doc: &Document,
    locator: &SourceLocator,
    warnings: &mut Vec<Warning>,
) -> Metadata {
    let ctx = SourceContext::new(doc, locator);

    let metadata = Metadata {
        title: first_value(&ctx, TITLE_SOURCES),
        author: first_value(&ctx, AUTHOR_SOURCES),
        published_at: resolve_date(&ctx, warnings),
        description: first_value(&ctx, DESCRIPTION_SOURCES),
        keywords: resolve_keywords(&ctx),
        canonical_url: first_value(&ctx, CANONICAL_URL_SOURCES),
        site_name: first_value(&ctx, SITE_NAME_SOURCES),
    };

    for field in Field::ALL {
        if !metadata.has(field) {
            tracing::debug!(field = %field, "metadata field unresolved");
            warnings.push(Warning::FieldUnresolved { field });
        }
    }

    metadata
}

fn first_value(ctx: &SourceContext<'_>, chain: &[Source]) -> Option<String> {
    chain.iter().find_map(|source| {
        let value = source.extract(ctx)?;
        tracing::trace!(source = %source, value = %value, "metadata candidate");
        Some(value)
    })
}

/// First date candidate that parses; unparsable ones are reported and skipped.
fn resolve_date(
    ctx: &SourceContext<'_>,
    warnings: &mut Vec<Warning>,
) -> Option<chrono::DateTime<chrono::Utc>> {
    let mut rejected: Vec<String> = Vec::new();
    for source in DATE_SOURCES {
        let Some(value) = source.extract(ctx) else {
            continue;
        };
        // Several sources can select the same element.
        if rejected.contains(&value) {
            continue;
        }

        if let Some(date) = parse_date(&value) {
            return Some(date);
        }

        rejected.push(value.clone());
        tracing::warn!(source = %source, value = %value, "could not parse date");
        warnings.push(Warning::UnparsableDate {
            source: source.to_string(),
            value,
        });
    }
    None
}

/// Keywords from `meta[name=keywords]`, else tag/category elements, else
/// JSON-LD; duplicates removed case-insensitively.
fn resolve_keywords(ctx: &SourceContext<'_>) -> Vec<String> {
    let from_meta: Vec<String> = ctx
        .meta()
        .get("keywords")
        .map(|content| {
            KEYWORD_DELIMITER
                .split(content)
                .map(clean_metadata_text)
                .filter(|k| !k.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let keywords = if !from_meta.is_empty() {
        from_meta
    } else {
        let from_elements: Vec<String> = ctx
            .doc
            .select(KEYWORD_ELEMENTS)
            .nodes()
            .iter()
            .take(MAX_KEYWORD_ELEMENTS)
            .map(|node| clean_metadata_text(&dom::clean_text(&Selection::from(*node))))
            .filter(|k| !k.is_empty())
            .collect();

        if from_elements.is_empty() {
            ctx.json_ld()
                .keywords()
                .iter()
                .map(|k| clean_metadata_text(k))
                .collect()
        } else {
            from_elements
        }
    };

    dedupe_case_insensitive(keywords)
}

/// Keep the first occurrence of each value, compared case-insensitively.
#[must_use]
pub fn dedupe_case_insensitive(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.to_lowercase()))
        .collect()
}
