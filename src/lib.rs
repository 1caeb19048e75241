//! # rs-capture
//!
//! Turns an HTML article into a normalized Obsidian note: the main content as
//! Markdown, plus front matter with title, author, dates, tags and a
//! collision-free filename.
//!
//! ## Quick Start
//!
//! ```rust
//! use rs_capture::{capture, CaptureRequest, Options, SourceLocator};
//!
//! let html = format!(
//!     r#"<html><head><meta property="og:title" content="My Article"></head>
//!     <body><article><p>{}</p></article></body></html>"#,
//!     "Main content here. ".repeat(10)
//! );
//!
//! let request = CaptureRequest::new(&html, SourceLocator::parse("https://example.com/my-article"));
//! let outcome = capture(&request, &Options::default())?;
//!
//! assert_eq!(outcome.extraction.selector, "article");
//! assert_eq!(outcome.filename.base, "my-article");
//! # Ok::<(), rs_capture::Error>(())
//! ```
//!
//! ## Pipeline
//!
//! 1. **Exclusion filter**: detach unwanted elements from a working copy
//! 2. **Selector engine**: first selector match with enough text wins
//! 3. **Metadata resolver**: priority fallback chains over the original tree
//! 4. **Tag engine**: config, CLI, keyword and URL-derived tags
//! 5. **Filename generator**: slug, truncation and collision suffixes
//!
//! Fatal errors are limited to configuration problems and the absence of
//! qualifying content; everything else degrades into [`Warning`]s.

mod error;
mod options;
mod patterns;
mod result;

/// DOM operations adapter over `dom_query`.
pub mod dom;

/// Exclusion filter with per-selector diagnostics.
pub mod exclusion;

/// Selector engine choosing the primary content element.
pub mod selector;

/// Metadata resolution (meta tags, JSON-LD, DOM elements, source URL).
pub mod metadata;

/// Tag merging, normalization and deduplication.
pub mod tags;

/// Slugs, truncation and filename collision handling.
pub mod naming;

/// URL helpers for hosts and path segments.
pub mod url_utils;

/// Source locators and local document loading.
pub mod source;

/// HTTP fetching with timeout and size limits.
pub mod fetch;

/// HTML fragment to Markdown conversion.
pub mod markdown;

/// Front matter assembly and YAML serialization.
pub mod front_matter;

/// Vault directory layout and exclusive file creation.
pub mod vault;

/// End-to-end capture pipeline.
pub mod capture;

// Public API - re-exports
pub use capture::{capture, preview, save, CaptureOutcome, CaptureRequest};
pub use error::{Error, Result};
pub use naming::{CollisionPolicy, FilenameCandidate, FilenameResolution, FilenameSource};
pub use options::{Options, DEFAULT_CONFIG_FILE};
pub use result::{ExclusionSummary, ExtractionResult, Field, Metadata, Warning};
pub use fetch::{load_html, FetchOptions};
pub use source::SourceLocator;
pub use tags::TagSet;
pub use vault::{Vault, WrittenNote};
