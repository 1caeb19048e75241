//! Markdown conversion of the extracted content fragment.
//!
//! The HTML fragment chosen by the selector engine is converted with
//! `quick_html2md`, then tidied: blank-line runs collapse to one blank line,
//! trailing whitespace and empty links are removed, and the text ends with a
//! single newline.

use quick_html2md::{html_to_markdown_with_options, MarkdownOptions};

use crate::patterns::{EMPTY_LINK, MULTIPLE_BLANK_LINES};

/// What the converter keeps from the fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownConfig {
    pub include_links: bool,
    pub include_images: bool,
    pub preserve_tables: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            include_links: true,
            include_images: true,
            preserve_tables: true,
        }
    }
}

/// Convert an HTML fragment to tidied Markdown.
#[must_use]
pub fn to_markdown(html_fragment: &str, config: &MarkdownConfig) -> String {
    let options = MarkdownOptions::new()
        .include_links(config.include_links)
        .include_images(config.include_images)
        .preserve_tables(config.preserve_tables);

    let raw = html_to_markdown_with_options(html_fragment, &options);
    post_process_markdown(&raw)
}

/// Normalize converter output.
#[must_use]
pub fn post_process_markdown(markdown: &str) -> String {
    let without_empty_links = EMPTY_LINK.replace_all(markdown, "");

    let trimmed_lines: Vec<&str> = without_empty_links.lines().map(str::trim_end).collect();
    let joined = trimmed_lines.join("\n");

    let collapsed = MULTIPLE_BLANK_LINES.replace_all(&joined, "\n\n");
    let body = collapsed.trim_matches('\n');

    if body.trim().is_empty() {
        return String::new();
    }
    format!("{body}\n")
}
