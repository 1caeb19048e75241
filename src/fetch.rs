//! Page Fetcher
//!
//! Loads the HTML behind a [`SourceLocator`]. URLs are fetched with a
//! blocking HTTP GET under a total timeout; the body is read through the same
//! size cap as local files, after an early rejection on an oversized
//! `Content-Length`. Paths go to [`read_document`].

use std::io;
use std::time::{Duration, Instant};

use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use url::Url;

use crate::error::{Error, Result};
use crate::patterns::CONTENT_TYPE_CHARSET;
use crate::source::{check_size, decode_html, read_document, read_limited, SourceLocator, DEFAULT_MAX_SIZE};

/// Default total request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User-Agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; rs-capture/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// How sources are loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Total time allowed for one request, body included.
    pub timeout: Duration,
    /// Maximum raw body size in bytes, for URLs and files alike.
    pub max_size: usize,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_size: DEFAULT_MAX_SIZE,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// A downloaded page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects.
    pub final_url: Url,
    pub status: u16,
    pub content_type: Option<String>,
    /// Body decoded to UTF-8.
    pub html: String,
    /// Body size before decoding.
    pub raw_size: usize,
    pub elapsed_ms: u64,
}

/// HTML for any locator: fetched for URLs, read from disk (or stdin) for paths.
pub fn load_html(locator: &SourceLocator, options: &FetchOptions) -> Result<String> {
    match locator {
        SourceLocator::Url(url) => fetch_html(url, options).map(|page| page.html),
        SourceLocator::Path(path) => read_document(path, options.max_size),
    }
}

/// GET `url` and decode the body.
///
/// Non-success statuses and transport failures are [`Error::Http`], an
/// expired timeout is [`Error::Timeout`], and an oversized body is
/// [`Error::SizeLimit`].
pub fn fetch_html(url: &Url, options: &FetchOptions) -> Result<FetchedPage> {
    let started = Instant::now();
    let client = Client::builder()
        .timeout(options.timeout)
        .user_agent(options.user_agent.as_str())
        .build()
        .map_err(|err| request_error(url, options, err))?;

    let response = client
        .get(url.as_str())
        .header(ACCEPT, ACCEPT_HTML)
        .header(ACCEPT_LANGUAGE, "en-US,en;q=0.5")
        .send()
        .and_then(Response::error_for_status)
        .map_err(|err| request_error(url, options, err))?;

    if let Some(length) = response.content_length() {
        check_size(usize::try_from(length).unwrap_or(usize::MAX), options.max_size)?;
    }

    let status = response.status().as_u16();
    let final_url = response.url().clone();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let bytes = read_limited(response, options.max_size).map_err(|source| {
        if is_timeout(&source) {
            Error::Timeout {
                url: url.to_string(),
                seconds: options.timeout.as_secs(),
            }
        } else {
            Error::Body {
                url: url.to_string(),
                source,
            }
        }
    })?;
    check_size(bytes.len(), options.max_size)?;

    let charset = content_type.as_deref().and_then(charset_from_content_type);
    let html = decode_html(&bytes, charset);
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    tracing::info!(
        url = %final_url,
        status,
        bytes = bytes.len(),
        elapsed_ms,
        "fetched page"
    );

    Ok(FetchedPage {
        final_url,
        status,
        content_type,
        html,
        raw_size: bytes.len(),
        elapsed_ms,
    })
}

/// `charset` parameter of a `Content-Type` header value.
#[must_use]
pub fn charset_from_content_type(content_type: &str) -> Option<&str> {
    CONTENT_TYPE_CHARSET
        .captures(content_type)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn request_error(url: &Url, options: &FetchOptions, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout {
            url: url.to_string(),
            seconds: options.timeout.as_secs(),
        }
    } else {
        Error::Http {
            url: url.to_string(),
            source: err,
        }
    }
}

/// Body reads surface reqwest timeouts wrapped in `io::Error`.
fn is_timeout(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::TimedOut
        || err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<reqwest::Error>())
            .is_some_and(reqwest::Error::is_timeout)
}
