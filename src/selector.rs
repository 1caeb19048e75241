//! Selector Engine
//!
//! Picks the primary content element from the filtered working tree. The
//! selector list is a priority order: for each selector, matched elements are
//! tried in document order and the first one whose normalized text reaches
//! the character threshold becomes the extraction result.

use crate::dom::{self, Document, Selection};
use crate::error::{Error, Result};
use crate::options::{check_selector_cap, Options};
use crate::result::{ExtractionResult, Warning};

/// Ordered content selectors plus the qualifying threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorSpec {
    /// Selectors in priority order.
    pub selectors: Vec<String>,
    /// Minimum character count of the trimmed, whitespace-collapsed text.
    pub min_content_chars: usize,
    /// Upper bound on `selectors.len()`.
    pub max_selectors: usize,
}

impl SelectorSpec {
    #[must_use]
    pub fn new(selectors: Vec<String>, min_content_chars: usize) -> Self {
        Self {
            selectors,
            min_content_chars,
            max_selectors: Options::default().max_selectors,
        }
    }
}

impl From<&Options> for SelectorSpec {
    fn from(options: &Options) -> Self {
        Self {
            selectors: options.selectors.clone(),
            min_content_chars: options.min_content_chars,
            max_selectors: options.max_selectors,
        }
    }
}

/// Find the first selector match with enough text.
///
/// Invalid selectors are skipped with a [`Warning::ContentSelectorInvalid`].
/// Fails with [`Error::NoContentMatched`] when nothing qualifies.
pub fn select_content(
    doc: &Document,
    spec: &SelectorSpec,
    warnings: &mut Vec<Warning>,
) -> Result<ExtractionResult> {
    check_selector_cap("selectors", spec.selectors.len(), spec.max_selectors)?;

    let mut attempted = Vec::with_capacity(spec.selectors.len());

    for selector in &spec.selectors {
        attempted.push(selector.clone());

        let Some(matcher) = dom::compile_selector(selector) else {
            tracing::warn!(selector = %selector, "skipping invalid content selector");
            warnings.push(Warning::ContentSelectorInvalid {
                selector: selector.clone(),
            });
            continue;
        };

        for node in dom::select_all(doc, &matcher).nodes() {
            let element = Selection::from(*node);
            let text = dom::clean_text(&element);
            let character_count = text.chars().count();

            if character_count < spec.min_content_chars {
                tracing::trace!(selector = %selector, character_count, "match below threshold");
                continue;
            }

            tracing::debug!(selector = %selector, character_count, "selected content");
            return Ok(ExtractionResult {
                selector: selector.clone(),
                html_fragment: dom::outer_html(&element),
                text,
                character_count,
                attempted_selectors: attempted,
                ..ExtractionResult::default()
            });
        }
    }

    Err(Error::NoContentMatched {
        min_chars: spec.min_content_chars,
        attempted,
    })
}
