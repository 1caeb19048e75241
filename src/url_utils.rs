//! URL Utility Functions
//!
//! Helpers for interpreting the source locator: absolute-URL detection,
//! hostname extraction and path segment access used by the metadata
//! resolver, the tag engine and the filename generator.

use percent_encoding::percent_decode_str;
use url::Url;

use crate::patterns::PAGE_EXTENSION;

/// Parse a string as an absolute http(s) URL with a host.
#[must_use]
pub fn parse_absolute_url(s: &str) -> Option<Url> {
    let s = s.trim();

    if !s.starts_with("http://") && !s.starts_with("https://") {
        return None;
    }

    Url::parse(s).ok().filter(|url| url.host_str().is_some())
}

/// Hostname of a URL without a leading `www.`.
#[must_use]
pub fn display_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.trim_end_matches('.').to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// Non-empty path segments of a URL, percent-decoded, page extensions removed
/// from the final segment.
#[must_use]
pub fn path_segments(url: &Url) -> Vec<String> {
    let mut segments: Vec<String> = url
        .path_segments()
        .map(|parts| {
            parts
                .filter(|part| !part.is_empty())
                .map(|part| percent_decode_str(part).decode_utf8_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();

    if let Some(last) = segments.last_mut() {
        *last = strip_page_extension(last);
    }

    segments.retain(|segment| !segment.is_empty());
    segments
}

/// Remove `.html`, `.php` and similar server-side page extensions.
#[must_use]
pub fn strip_page_extension(segment: &str) -> String {
    PAGE_EXTENSION.replace(segment, "").into_owned()
}
