//! Metadata candidate sources.
//!
//! Each [`Source`] variant names one place a field value can come from and
//! knows how to read it. Field resolution walks a fixed slice of sources and
//! stops at the first one that yields a non-empty value, so later sources are
//! never evaluated once an earlier one succeeds.

use std::cell::OnceCell;
use std::fmt;

use super::json_ld::{JsonLd, JsonLdField};
use super::meta_tags::MetaIndex;
use crate::dom::{self, Document, Selection};
use crate::patterns::CONTROL_CHARS;
use crate::source::SourceLocator;
use crate::url_utils;

/// One candidate location for a metadata value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// `<meta>` tag by `name`/`property`/`itemprop`.
    Meta(&'static str),
    /// `href` of `<link rel="...">`.
    LinkRel(&'static str),
    /// Text of the first matching element with non-empty text.
    ElementText(&'static str),
    /// Attribute of the first matching element carrying it.
    ElementAttr(&'static str, &'static str),
    /// JSON-LD property.
    JsonLd(JsonLdField),
    /// The source URL itself.
    SourceUrl,
    /// Host of the source URL without `www.`.
    SourceHost,
}

impl Source {
    /// Read this source, returning a cleaned non-empty value.
    #[must_use]
    pub fn extract(&self, ctx: &SourceContext<'_>) -> Option<String> {
        let raw = match *self {
            Source::Meta(key) => ctx.meta().get(key).map(str::to_string),
            Source::LinkRel(rel) => element_attr(ctx.doc, &format!(r#"link[rel="{rel}"]"#), "href"),
            Source::ElementText(css) => ctx.doc.select(css).nodes().iter().find_map(|node| {
                let text = dom::clean_text(&Selection::from(*node));
                (!text.is_empty()).then_some(text)
            }),
            Source::ElementAttr(css, attr) => element_attr(ctx.doc, css, attr),
            Source::JsonLd(field) => ctx.json_ld().get(field),
            Source::SourceUrl => ctx.locator.as_url().map(ToString::to_string),
            Source::SourceHost => ctx.locator.as_url().and_then(url_utils::display_host),
        }?;

        let cleaned = clean_metadata_text(&raw);
        (!cleaned.is_empty()).then_some(cleaned)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Meta(key) => write!(f, "meta[{key}]"),
            Source::LinkRel(rel) => write!(f, "link[rel={rel}]"),
            Source::ElementText(css) => write!(f, "element({css})"),
            Source::ElementAttr(css, attr) => write!(f, "element({css})@{attr}"),
            Source::JsonLd(field) => write!(f, "json-ld.{}", field.key()),
            Source::SourceUrl => f.write_str("source-url"),
            Source::SourceHost => f.write_str("source-host"),
        }
    }
}

fn element_attr(doc: &Document, css: &str, attr: &str) -> Option<String> {
    doc.select(css).nodes().iter().find_map(|node| {
        dom::get_attribute(&Selection::from(*node), attr).filter(|value| !value.trim().is_empty())
    })
}

/// Trim, collapse whitespace and strip control characters.
#[must_use]
pub fn clean_metadata_text(text: &str) -> String {
    let collapsed = dom::normalize_whitespace(text);
    CONTROL_CHARS.replace_all(&collapsed, "").trim().to_string()
}

/// Everything sources read from, with the meta index and JSON-LD built on
/// first use.
pub struct SourceContext<'a> {
    pub(crate) doc: &'a Document,
    pub(crate) locator: &'a SourceLocator,
    meta: OnceCell<MetaIndex>,
    json_ld: OnceCell<JsonLd>,
}

impl<'a> SourceContext<'a> {
    #[must_use]
    pub fn new(doc: &'a Document, locator: &'a SourceLocator) -> Self {
        Self {
            doc,
            locator,
            meta: OnceCell::new(),
            json_ld: OnceCell::new(),
        }
    }

    pub(crate) fn meta(&self) -> &MetaIndex {
        self.meta.get_or_init(|| MetaIndex::from_document(self.doc))
    }

    pub(crate) fn json_ld(&self) -> &JsonLd {
        self.json_ld.get_or_init(|| JsonLd::from_document(self.doc))
    }
}

// === Candidate chains ===

pub const TITLE_SOURCES: &[Source] = &[
    Source::Meta("og:title"),
    Source::Meta("twitter:title"),
    Source::Meta("title"),
    Source::Meta("article:title"),
    Source::Meta("headline"),
    Source::Meta("sailthru.title"),
    Source::ElementText(".article-title"),
    Source::ElementText(".post-title"),
    Source::ElementText(".entry-title"),
    Source::ElementText(".page-title"),
    Source::ElementText(".story-title"),
    Source::ElementText(".content-title"),
    Source::ElementText("header h1"),
    Source::ElementText("article h1"),
    Source::ElementText("h1"),
    Source::ElementText(".title"),
    Source::ElementText("title"),
];

pub const AUTHOR_SOURCES: &[Source] = &[
    Source::ElementText(r#"[rel="author"]"#),
    Source::ElementText(".author"),
    Source::ElementText(".byline"),
    Source::ElementText(".writer"),
    Source::Meta("author"),
    Source::Meta("article:author"),
    Source::JsonLd(JsonLdField::Author),
];

pub const DATE_SOURCES: &[Source] = &[
    Source::ElementAttr("time[datetime]", "datetime"),
    Source::ElementAttr("[datetime]", "datetime"),
    Source::Meta("article:published_time"),
    Source::ElementText(".published"),
    Source::ElementText(".date"),
    Source::ElementText(".post-date"),
    Source::ElementText(".entry-date"),
    Source::JsonLd(JsonLdField::DatePublished),
];

pub const DESCRIPTION_SOURCES: &[Source] = &[
    Source::Meta("og:description"),
    Source::Meta("description"),
    Source::Meta("twitter:description"),
    Source::JsonLd(JsonLdField::Description),
];

pub const CANONICAL_URL_SOURCES: &[Source] = &[
    Source::LinkRel("canonical"),
    Source::Meta("og:url"),
    Source::SourceUrl,
];

pub const SITE_NAME_SOURCES: &[Source] = &[
    Source::Meta("og:site_name"),
    Source::Meta("application-name"),
    Source::JsonLd(JsonLdField::Publisher),
    Source::SourceHost,
];

/// Elements listing article tags or categories.
pub const KEYWORD_ELEMENTS: &str =
    ".tags a, .tag, .categories a, .category, .post-tags a, .article-tags a";

/// Most keyword elements read from the page body.
pub const MAX_KEYWORD_ELEMENTS: usize = 10;
