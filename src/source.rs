//! Source locators and local document loading.
//!
//! A capture always knows where its HTML came from: either a web URL
//! (fetched by [`crate::fetch`] or given alongside a saved page) or a local
//! file path. Bytes are size-checked and transcoded to UTF-8 using the
//! charset the transport or the page declares.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_8};
use url::Url;

use crate::error::{Error, Result};
use crate::patterns::CHARSET_META;
use crate::url_utils;

/// Default maximum raw document size in bytes.
pub const DEFAULT_MAX_SIZE: usize = 2_000_000;

/// Where a document came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocator {
    /// Absolute http(s) URL.
    Url(Url),
    /// Local file path (or `-` for standard input).
    Path(PathBuf),
}

impl SourceLocator {
    /// Interpret a string as a URL when it is an absolute http(s) URL,
    /// otherwise as a path.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        match url_utils::parse_absolute_url(input) {
            Some(url) => Self::Url(url),
            None => Self::Path(PathBuf::from(input.trim())),
        }
    }

    /// The URL, if this locator is one.
    #[must_use]
    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Self::Url(url) => Some(url),
            Self::Path(_) => None,
        }
    }

    /// Path-like segments: URL path segments, or the file stem of a path.
    #[must_use]
    pub fn segments(&self) -> Vec<String> {
        match self {
            Self::Url(url) => url_utils::path_segments(url),
            Self::Path(path) => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .filter(|stem| !stem.is_empty() && stem != "-")
                .into_iter()
                .collect(),
        }
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Read a local document (`-` reads standard input) and decode it to UTF-8.
pub fn read_document(path: &Path, max_size: usize) -> Result<String> {
    let read_error = |source| Error::Read {
        path: path.to_path_buf(),
        source,
    };

    let bytes = if path == Path::new("-") {
        read_limited(std::io::stdin().lock(), max_size).map_err(read_error)?
    } else {
        let metadata = std::fs::metadata(path).map_err(read_error)?;
        check_size(usize::try_from(metadata.len()).unwrap_or(usize::MAX), max_size)?;
        std::fs::read(path).map_err(read_error)?
    };

    check_size(bytes.len(), max_size)?;
    Ok(decode_html(&bytes, None))
}

/// Read at most `max_size + 1` bytes, enough to tell whether the source
/// exceeds the limit without buffering all of it.
pub fn read_limited<R: Read>(reader: R, max_size: usize) -> std::io::Result<Vec<u8>> {
    let cap = u64::try_from(max_size).unwrap_or(u64::MAX).saturating_add(1);
    let mut bytes = Vec::new();
    reader.take(cap).read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Fail with [`Error::SizeLimit`] when `size` exceeds `limit`.
pub fn check_size(size: usize, limit: usize) -> Result<()> {
    if size > limit {
        return Err(Error::SizeLimit { size, limit });
    }
    Ok(())
}

/// Decode HTML bytes to UTF-8.
///
/// A charset from the transport (an HTTP `Content-Type` header) wins over
/// one declared in the first 1024 bytes. Undeclared documents are treated
/// as UTF-8; invalid sequences become U+FFFD rather than failing the capture.
#[must_use]
pub fn decode_html(bytes: &[u8], transport_charset: Option<&str>) -> String {
    let encoding = transport_charset
        .and_then(|label| Encoding::for_label(label.trim().as_bytes()))
        .unwrap_or_else(|| detect_encoding(bytes));
    let (text, actual, had_errors) = encoding.decode(bytes);

    if had_errors {
        tracing::debug!(encoding = actual.name(), "replaced invalid byte sequences");
    }

    text.into_owned()
}

/// Charset declared by `<meta charset>` or `http-equiv` Content-Type.
#[must_use]
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(1024)]);

    CHARSET_META
        .captures(&head)
        .and_then(|caps| caps.get(1))
        .and_then(|label| Encoding::for_label(label.as_str().as_bytes()))
        .unwrap_or(UTF_8)
}
