//! Filename Generator
//!
//! Derives a filesystem-safe note name from the resolved title, falling back
//! to the source URL, its host and finally a timestamped placeholder.
//! Collisions are resolved against an [`ExistingNames`] snapshot by trying
//! `base-1.md`, `base-2.md`, ... until a free name is found.

use std::collections::{BTreeSet, HashSet};
use std::hash::BuildHasher;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use deunicode::deunicode;
use serde::Serialize;

use crate::patterns::{APOSTROPHE, SLUG_INVALID};
use crate::source::SourceLocator;
use crate::url_utils;

/// Extension of every note.
pub const EXTENSION: &str = "md";

/// Base used when neither title nor source yield a slug.
pub const PLACEHOLDER_BASE: &str = "article";

/// How far before the length limit a hyphen may sit and still be used as
/// the cut point.
pub const WORD_BOUNDARY_TOLERANCE: usize = 20;

/// Where the base slug came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilenameSource {
    Title,
    Url,
    Host,
    Placeholder,
}

/// Slug chosen for a capture, before collision handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilenameCandidate {
    pub base: String,
    pub source: FilenameSource,
}

/// Final, collision-free note filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilenameResolution {
    /// Slug without suffix or extension.
    pub base: String,
    /// `base[-n].md`
    pub filename: String,
    /// Numeric suffix applied to avoid a collision.
    pub suffix: Option<u64>,
    pub source: FilenameSource,
}

/// Whether collisions are suffixed or the existing note is replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    #[default]
    Suffix,
    Overwrite,
}

impl CollisionPolicy {
    #[must_use]
    pub fn from_overwrite(overwrite: bool) -> Self {
        if overwrite {
            Self::Overwrite
        } else {
            Self::Suffix
        }
    }
}

/// Filenames already present in the target directory.
///
/// Queried once per candidate name, so an implementation backed by the
/// filesystem sees names created during the search.
pub trait ExistingNames {
    fn contains_name(&self, filename: &str) -> bool;
}

impl<S: BuildHasher> ExistingNames for HashSet<String, S> {
    fn contains_name(&self, filename: &str) -> bool {
        self.contains(filename)
    }
}

impl ExistingNames for BTreeSet<String> {
    fn contains_name(&self, filename: &str) -> bool {
        self.contains(filename)
    }
}

impl ExistingNames for [&str] {
    fn contains_name(&self, filename: &str) -> bool {
        self.contains(&filename)
    }
}

/// Live view of a directory.
#[derive(Debug, Clone)]
pub struct DirectoryNames {
    dir: PathBuf,
}

impl DirectoryNames {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }
}

impl ExistingNames for DirectoryNames {
    fn contains_name(&self, filename: &str) -> bool {
        self.dir.join(filename).exists()
    }
}

// === Slugs ===

/// Lowercase ASCII slug: letters, digits and single inner hyphens.
///
/// Non-ASCII text is transliterated first, so accented and non-Latin titles
/// keep their words.
#[must_use]
pub fn slugify(text: &str) -> String {
    let ascii = deunicode(text).to_lowercase();
    let without_apostrophes = APOSTROPHE.replace_all(&ascii, "");
    SLUG_INVALID
        .replace_all(&without_apostrophes, "-")
        .trim_matches('-')
        .to_string()
}

/// Shorten a slug to `max_len`, cutting at a hyphen when one lies within
/// [`WORD_BOUNDARY_TOLERANCE`] of the limit.
#[must_use]
pub fn truncate_slug(slug: &str, max_len: usize) -> String {
    if slug.len() <= max_len {
        return slug.to_string();
    }

    // Slugs are ASCII, so byte offsets are char offsets.
    let window = &slug[..=max_len];
    let min_cut = max_len.saturating_sub(WORD_BOUNDARY_TOLERANCE).max(1);

    match window.rfind('-') {
        Some(cut) if cut >= min_cut => slug[..cut].trim_end_matches('-').to_string(),
        _ => slug[..max_len].trim_end_matches('-').to_string(),
    }
}

// === Generation ===

/// Choose the base slug for a note.
#[must_use]
pub fn generate_filename(
    title: Option<&str>,
    locator: &SourceLocator,
    max_len: usize,
    captured_at: DateTime<Utc>,
) -> FilenameCandidate {
    let (slug, source) = title
        .map(slugify)
        .filter(|s| !s.is_empty())
        .map(|s| (s, FilenameSource::Title))
        .or_else(|| url_slug(locator).map(|s| (s, FilenameSource::Url)))
        .or_else(|| host_slug(locator).map(|s| (s, FilenameSource::Host)))
        .unwrap_or_else(|| {
            (
                format!("{PLACEHOLDER_BASE}-{}", captured_at.format("%Y%m%d-%H%M%S")),
                FilenameSource::Placeholder,
            )
        });

    let base = truncate_slug(&slug, max_len);
    tracing::debug!(base = %base, source = ?source, "generated filename");

    FilenameCandidate { base, source }
}

/// Last two path segments joined by a hyphen.
fn url_slug(locator: &SourceLocator) -> Option<String> {
    let segments = locator.segments();
    let tail = &segments[segments.len().saturating_sub(2)..];
    let slug = slugify(&tail.join("-"));
    (!slug.is_empty()).then_some(slug)
}

fn host_slug(locator: &SourceLocator) -> Option<String> {
    let host = url_utils::display_host(locator.as_url()?)?;
    let slug = slugify(&host);
    (!slug.is_empty()).then_some(slug)
}

/// Pick a free filename for `candidate`.
///
/// The search is not capped: it stops at the first free `base-N.md`. The
/// answer is only valid for the snapshot `existing` describes; writers must
/// still create the file exclusively.
pub fn resolve_collision<E>(
    candidate: &FilenameCandidate,
    existing: &E,
    policy: CollisionPolicy,
) -> FilenameResolution
where
    E: ExistingNames + ?Sized,
{
    let base = candidate.base.clone();
    let plain = format!("{base}.{EXTENSION}");

    if policy == CollisionPolicy::Overwrite || !existing.contains_name(&plain) {
        return FilenameResolution {
            base,
            filename: plain,
            suffix: None,
            source: candidate.source,
        };
    }

    let mut n: u64 = 1;
    loop {
        let filename = format!("{base}-{n}.{EXTENSION}");
        if !existing.contains_name(&filename) {
            tracing::debug!(filename = %filename, "resolved filename collision");
            return FilenameResolution {
                base,
                filename,
                suffix: Some(n),
                source: candidate.source,
            };
        }
        n += 1;
    }
}
