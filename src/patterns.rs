//! Compiled regex patterns shared across the pipeline.
//!
//! All patterns are compiled once on first use via `LazyLock`.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

/// Runs of any whitespace.
pub static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE regex"));

/// C0/C1 control characters stripped from metadata text.
pub static CONTROL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x1f\x7f-\x9f]").expect("CONTROL_CHARS regex"));

/// Delimiters between entries of a `keywords` meta tag.
pub static KEYWORD_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;|]").expect("KEYWORD_DELIMITER regex"));

/// Characters dropped when a keyword becomes a tag token.
pub static TAG_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("TAG_PUNCTUATION regex"));

/// Separators between words of a URL path segment.
pub static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("NON_ALPHANUMERIC regex"));

/// Server-side page extensions stripped from path segments.
pub static PAGE_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(html?|php|aspx?|jsp)$").expect("PAGE_EXTENSION regex")
});

/// Apostrophes dropped inside words so "don't" slugs to "dont".
pub static APOSTROPHE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"['\u{2019}\u{2018}`]").expect("APOSTROPHE regex"));

/// Anything a slug may not contain.
pub static SLUG_INVALID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("SLUG_INVALID regex"));

/// Three or more consecutive blank lines in Markdown output.
pub static MULTIPLE_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n(\s*\n)+").expect("MULTIPLE_BLANK_LINES regex"));

/// Links without text left behind by removed inline content.
pub static EMPTY_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\]\([^)]*\)").expect("EMPTY_LINK regex"));

/// `<meta charset="...">` declaration.
pub static CHARSET_META: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s/>;]+)"#).expect("CHARSET_META regex")
});

/// `charset` parameter of an HTTP `Content-Type` header.
pub static CONTENT_TYPE_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)charset\s*=\s*"?([^";\s]+)"#).expect("CONTENT_TYPE_CHARSET regex")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_extension() {
        assert!(PAGE_EXTENSION.is_match("post.html"));
        assert!(PAGE_EXTENSION.is_match("index.PHP"));
        assert!(!PAGE_EXTENSION.is_match("image.png"));
    }

    #[test]
    fn test_keyword_delimiter() {
        let parts: Vec<&str> = KEYWORD_DELIMITER.split("a, b; c|d").collect();
        assert_eq!(parts.len(), 4);
    }

    #[test]
    fn test_charset_meta() {
        let caps = CHARSET_META.captures(r#"<meta charset="ISO-8859-1">"#).unwrap();
        assert_eq!(&caps[1], "ISO-8859-1");

        let caps = CHARSET_META
            .captures(r#"<meta http-equiv="Content-Type" content="text/html; charset=windows-1252">"#)
            .unwrap();
        assert_eq!(&caps[1], "windows-1252");
    }
}
