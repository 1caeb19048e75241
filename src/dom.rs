//! DOM Operations Adapter
//!
//! Thin layer over the `dom_query` crate. The parsed [`Document`] is an
//! arena of nodes; detaching a node only unlinks it from its parent, so the
//! pipeline works on a cloned working copy and never mutates the caller's
//! original tree.

pub use dom_query::{Document, Matcher, NodeRef, Selection};

use crate::patterns::WHITESPACE;

/// Elements that are never removed by exclusion.
pub const PROTECTED_ROOTS: &[&str] = &["html", "body"];

/// Elements whose text never counts as content.
const NON_CONTENT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

// === Parsing ===

/// Parse HTML string into document
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// Deep-copy a document into an independent working tree.
#[must_use]
pub fn clone_document(doc: &Document) -> Document {
    Document::from(doc.html().to_string())
}

// === Selectors ===

/// Compile a CSS selector, returning `None` when the syntax is invalid.
///
/// `Document::select` panics on invalid selectors, so anything user-provided
/// goes through here first.
#[must_use]
pub fn compile_selector(css: &str) -> Option<Matcher> {
    let css = css.trim();
    if css.is_empty() {
        return None;
    }
    Matcher::new(css).ok()
}

/// All elements matching a compiled selector, in document order.
#[inline]
#[must_use]
pub fn select_all<'a>(doc: &'a Document, matcher: &Matcher) -> Selection<'a> {
    doc.select_matcher(matcher)
}

/// Number of elements currently attached to the document.
#[must_use]
pub fn element_count(doc: &Document) -> usize {
    doc.select("*").length()
}

// === Node information ===

/// Get any attribute value of the first node in the selection.
#[inline]
#[must_use]
pub fn get_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|s| s.to_string())
}

/// Whether the node is `<html>` or `<body>`.
#[must_use]
pub fn is_protected_root(node: &NodeRef<'_>) -> bool {
    node.node_name()
        .is_some_and(|name| PROTECTED_ROOTS.iter().any(|root| name.eq_ignore_ascii_case(root)))
}

/// Get outer HTML content
#[inline]
#[must_use]
pub fn outer_html(sel: &Selection) -> String {
    sel.html().to_string()
}

// === Text Content ===

/// Text of every node in the selection, text nodes joined by `separator`.
///
/// Unlike `Selection::text`, adjacent block elements do not run together
/// (`<p>a</p><p>b</p>` yields `a b` with a space separator), and script or
/// style contents are skipped.
#[must_use]
pub fn collect_text(sel: &Selection, separator: &str) -> String {
    let mut parts = Vec::new();
    for node in sel.nodes() {
        push_text(node, &mut parts);
    }
    parts.join(separator)
}

fn push_text(node: &NodeRef<'_>, parts: &mut Vec<String>) {
    if node.is_text() {
        let text = node.text();
        let text = text.trim();
        if !text.is_empty() {
            parts.push(text.to_string());
        }
        return;
    }

    if node.is_element()
        && node
            .node_name()
            .is_some_and(|name| NON_CONTENT_ELEMENTS.contains(&&*name))
    {
        return;
    }

    let mut child = node.first_child();
    while let Some(current) = child {
        push_text(&current, parts);
        child = current.next_sibling();
    }
}

/// Collapse whitespace runs to single spaces and trim.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Space-separated, whitespace-normalized text of a selection.
#[must_use]
pub fn clean_text(sel: &Selection) -> String {
    normalize_whitespace(&collect_text(sel, " "))
}
