//! Capture pipeline.
//!
//! Wires the components together in a fixed order: exclusion filter on a
//! working copy, content selection on the filtered tree, metadata from the
//! original tree, tags, filename, Markdown conversion and front matter.
//! Nothing touches the filesystem until [`save`] is called.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_yaml::Mapping;

use crate::dom;
use crate::error::Result;
use crate::exclusion::{apply_exclusions, SelectorResult};
use crate::front_matter::{build_front_matter, render_note, NoteFields};
use crate::markdown::{to_markdown, MarkdownConfig};
use crate::metadata::resolve_metadata;
use crate::naming::{
    generate_filename, resolve_collision, CollisionPolicy, DirectoryNames, ExistingNames,
    FilenameCandidate, FilenameResolution,
};
use crate::options::Options;
use crate::result::{ExtractionResult, Metadata, Warning};
use crate::selector::{select_content, SelectorSpec};
use crate::source::SourceLocator;
use crate::tags::{build_tags, TagSet};
use crate::vault::{Vault, WrittenNote};

/// One document to capture.
#[derive(Debug, Clone)]
pub struct CaptureRequest<'a> {
    /// Decoded HTML.
    pub html: &'a str,
    /// Where the HTML came from.
    pub locator: SourceLocator,
    /// Tags given on the command line.
    pub cli_tags: Vec<String>,
    /// Capture time; drives `retrieved_at`, the date folder and placeholder names.
    pub captured_at: DateTime<Utc>,
}

impl<'a> CaptureRequest<'a> {
    #[must_use]
    pub fn new(html: &'a str, locator: SourceLocator) -> Self {
        Self {
            html,
            locator,
            cli_tags: Vec::new(),
            captured_at: Utc::now(),
        }
    }
}

/// Everything resolved for a note, ready to be written.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureOutcome {
    pub source: String,
    pub extraction: ExtractionResult,
    pub exclusion_results: Vec<SelectorResult>,
    pub metadata: Metadata,
    pub tags: TagSet,
    pub filename: FilenameCandidate,
    #[serde(skip)]
    pub markdown: String,
    pub front_matter: Mapping,
    pub warnings: Vec<Warning>,
    pub captured_at: DateTime<Utc>,
}

impl CaptureOutcome {
    /// Front matter plus Markdown body.
    pub fn note_text(&self) -> Result<String> {
        render_note(&self.front_matter, &self.markdown)
    }

    /// Final filename against a snapshot of existing names.
    pub fn resolve_filename<E>(&self, existing: &E, policy: CollisionPolicy) -> FilenameResolution
    where
        E: ExistingNames + ?Sized,
    {
        resolve_collision(&self.filename, existing, policy)
    }
}

/// Run the pipeline on one document.
///
/// Fails only on invalid configuration or when no content selector
/// qualifies; in the latter case no metadata or filename work is done.
pub fn capture(request: &CaptureRequest<'_>, options: &Options) -> Result<CaptureOutcome> {
    options.validate()?;

    let original = dom::parse(request.html);

    let exclusion = apply_exclusions(&original, options)?;
    let mut warnings = exclusion.warnings;

    let mut extraction = select_content(
        &exclusion.document,
        &SelectorSpec::from(options),
        &mut warnings,
    )?;
    extraction.exclusion = exclusion.summary;

    let metadata = resolve_metadata(&original, &request.locator, &mut warnings);

    let tags = build_tags(
        &options.tags,
        &request.cli_tags,
        &metadata.keywords,
        &request.locator,
    );

    let filename = generate_filename(
        metadata.title.as_deref(),
        &request.locator,
        options.max_filename_length,
        request.captured_at,
    );

    let markdown = to_markdown(&extraction.html_fragment, &MarkdownConfig::default());

    let front_matter = build_front_matter(
        &NoteFields {
            metadata: &metadata,
            source: &request.locator,
            tags: &tags,
            selector: &extraction.selector,
            retrieved_at: request.captured_at,
        },
        options,
    );

    tracing::debug!(
        source = %request.locator,
        selector = %extraction.selector,
        characters = extraction.character_count,
        filename = %filename.base,
        warnings = warnings.len(),
        "capture resolved"
    );

    Ok(CaptureOutcome {
        source: request.locator.to_string(),
        extraction,
        exclusion_results: exclusion.selector_results,
        metadata,
        tags,
        filename,
        markdown,
        front_matter,
        warnings,
        captured_at: request.captured_at,
    })
}

/// Directory the note for `outcome` belongs in.
#[must_use]
pub fn target_dir(vault: &Vault, outcome: &CaptureOutcome, options: &Options) -> PathBuf {
    vault.target_dir(outcome.captured_at, options.subfolder.as_deref())
}

/// Filename a write would use right now, without writing.
#[must_use]
pub fn preview(vault: &Vault, outcome: &CaptureOutcome, options: &Options) -> (PathBuf, FilenameResolution) {
    let dir = target_dir(vault, outcome, options);
    let resolution = outcome.resolve_filename(
        &DirectoryNames::new(&dir),
        CollisionPolicy::from_overwrite(options.overwrite),
    );
    (dir.join(&resolution.filename), resolution)
}

/// Write the note into the vault.
pub fn save(vault: &Vault, outcome: &CaptureOutcome, options: &Options) -> Result<WrittenNote> {
    let contents = outcome.note_text()?;
    let dir = target_dir(vault, outcome, options);
    vault.write_note(
        &dir,
        &outcome.filename,
        CollisionPolicy::from_overwrite(options.overwrite),
        &contents,
    )
}
