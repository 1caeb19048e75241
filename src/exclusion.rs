//! Exclusion Filter
//!
//! Detaches elements matching the configured exclusion selectors from a
//! working copy of the document before content selection. Selectors run in
//! order and removals are cumulative: later selectors only see what earlier
//! ones left behind. `<html>` and `<body>` are never detached.
//!
//! Apart from an over-limit selector list, nothing here fails the capture;
//! problems are reported as [`Warning`]s on the [`ExclusionResult`].

use std::time::Instant;

use serde::Serialize;

use crate::dom::{self, Document, Selection};
use crate::error::Result;
use crate::options::{check_selector_cap, Options};
use crate::result::{ExclusionSummary, Warning};

/// What a single exclusion selector did to the working tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SelectorOutcome {
    /// Detached this many matched elements.
    Removed(usize),
    /// Valid selector, no match in the current working tree.
    Unmatched,
    /// Every match was a protected root element.
    ProtectedOnly,
    /// Selector string was empty.
    Empty,
    /// Selector string is not valid CSS.
    Invalid,
}

impl SelectorOutcome {
    /// Removed at least one element.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Removed(n) if *n > 0)
    }

    /// Could not be applied at all.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::ProtectedOnly | Self::Empty | Self::Invalid)
    }

    fn removed(&self) -> usize {
        match self {
            Self::Removed(n) => *n,
            _ => 0,
        }
    }
}

/// One selector and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorResult {
    pub selector: String,
    pub outcome: SelectorOutcome,
}

/// Filtered working tree plus diagnostics.
pub struct ExclusionResult {
    /// Working copy with excluded elements detached.
    pub document: Document,
    /// Aggregate counts.
    pub summary: ExclusionSummary,
    /// Per-selector outcomes, in configuration order.
    pub selector_results: Vec<SelectorResult>,
    /// Advisory warnings; never change control flow.
    pub warnings: Vec<Warning>,
}

/// Apply `options.exclusion_selectors` to a clone of `original`.
///
/// The original document is left untouched. Returns
/// [`Error::Configuration`](crate::Error::Configuration) before any work
/// when the list exceeds `options.max_selectors`.
pub fn apply_exclusions(original: &Document, options: &Options) -> Result<ExclusionResult> {
    let selectors = &options.exclusion_selectors;
    check_selector_cap("exclusion_selectors", selectors.len(), options.max_selectors)?;

    let started = Instant::now();
    let document = dom::clone_document(original);
    let total_elements = dom::element_count(&document);

    let selector_results: Vec<SelectorResult> = selectors
        .iter()
        .map(|selector| SelectorResult {
            selector: selector.clone(),
            outcome: exclude_selector(&document, selector),
        })
        .collect();

    let mut summary = ExclusionSummary {
        selectors_attempted: selector_results.len(),
        selectors_matched: selector_results
            .iter()
            .filter(|r| r.outcome.is_success())
            .count(),
        selectors_failed: selector_results
            .iter()
            .filter(|r| r.outcome.is_failure())
            .count(),
        elements_removed: selector_results.iter().map(|r| r.outcome.removed()).sum(),
        total_elements,
        ..ExclusionSummary::default()
    };

    summary.high_removal = summary.removal_ratio() > options.high_removal_ratio;
    summary.empty_primary_content =
        !selectors.is_empty() && is_primary_content_empty(&document, options);
    summary.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let warnings = collect_warnings(&summary, &selector_results);
    log_exclusion(&summary, &warnings);

    Ok(ExclusionResult {
        document,
        summary,
        selector_results,
        warnings,
    })
}

/// Detach every non-root element matching `selector`.
fn exclude_selector(doc: &Document, selector: &str) -> SelectorOutcome {
    if selector.trim().is_empty() {
        return SelectorOutcome::Empty;
    }

    let Some(matcher) = dom::compile_selector(selector) else {
        return SelectorOutcome::Invalid;
    };

    let matches = dom::select_all(doc, &matcher);
    if matches.is_empty() {
        return SelectorOutcome::Unmatched;
    }

    let mut removed = 0;
    for node in matches.nodes() {
        if dom::is_protected_root(node) {
            continue;
        }
        Selection::from(*node).remove();
        removed += 1;
    }

    if removed == 0 {
        SelectorOutcome::ProtectedOnly
    } else {
        SelectorOutcome::Removed(removed)
    }
}

/// True when no primary content element holds non-whitespace text.
///
/// A document with no primary content element at all also counts as empty.
#[must_use]
pub fn is_primary_content_empty(doc: &Document, options: &Options) -> bool {
    !options
        .primary_content_selectors
        .iter()
        .filter_map(|css| dom::compile_selector(css))
        .any(|matcher| {
            dom::select_all(doc, &matcher)
                .nodes()
                .iter()
                .any(|node| !dom::clean_text(&Selection::from(*node)).is_empty())
        })
}

fn collect_warnings(summary: &ExclusionSummary, results: &[SelectorResult]) -> Vec<Warning> {
    let mut warnings: Vec<Warning> = results
        .iter()
        .filter_map(|result| {
            let selector = result.selector.clone();
            let reason = match result.outcome {
                SelectorOutcome::Removed(_) => return None,
                SelectorOutcome::Unmatched => {
                    return Some(Warning::ExclusionSelectorUnmatched { selector })
                }
                SelectorOutcome::ProtectedOnly => {
                    "only matched protected elements (html, body)"
                }
                SelectorOutcome::Empty => "empty selector",
                SelectorOutcome::Invalid => "invalid CSS selector syntax",
            };
            Some(Warning::ExclusionSelectorFailed {
                selector,
                reason: reason.to_string(),
            })
        })
        .collect();

    if summary.high_removal {
        warnings.push(Warning::HighRemoval {
            ratio: summary.removal_ratio(),
            removed: summary.elements_removed,
            total: summary.total_elements,
        });
    }

    if summary.empty_primary_content {
        warnings.push(Warning::EmptyPrimaryContent);
    }

    warnings
}

fn log_exclusion(summary: &ExclusionSummary, warnings: &[Warning]) {
    for warning in warnings {
        match warning {
            Warning::HighRemoval {
                ratio,
                removed,
                total,
            } => tracing::warn!(
                ratio = *ratio,
                removed = *removed,
                total = *total,
                warning_type = "high_removal",
                "{warning}"
            ),
            Warning::EmptyPrimaryContent => tracing::warn!(
                removed = summary.elements_removed,
                warning_type = "empty_primary_content",
                "{warning}"
            ),
            other => tracing::warn!(operation = "exclude", "{other}"),
        }
    }

    if summary.elements_removed > 0 {
        tracing::info!(
            selectors_attempted = summary.selectors_attempted,
            selectors_matched = summary.selectors_matched,
            elements_removed = summary.elements_removed,
            removal_ratio = summary.removal_ratio(),
            elapsed_ms = summary.elapsed_ms,
            "exclusion summary: {}/{} selectors removed {} elements ({:.1}% of document)",
            summary.selectors_matched,
            summary.selectors_attempted,
            summary.elements_removed,
            summary.removal_ratio() * 100.0
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options_with(selectors: &[&str]) -> Options {
        Options {
            exclusion_selectors: selectors.iter().map(|s| (*s).to_string()).collect(),
            ..Options::default()
        }
    }

    #[test]
    fn test_basic_removal() {
        let doc = dom::parse(
            r#"<html><body><article><p>Main content</p><div class="ad">Buy now</div></article></body></html>"#,
        );
        let result = apply_exclusions(&doc, &options_with(&[".ad"])).unwrap();

        assert!(result.document.select(".ad").is_empty());
        assert_eq!(result.summary.elements_removed, 1);
        assert_eq!(result.summary.selectors_matched, 1);
        assert_eq!(
            result.selector_results[0].outcome,
            SelectorOutcome::Removed(1)
        );
    }

    #[test]
    fn test_original_document_untouched() {
        let doc = dom::parse(r#"<html><body><nav>menu</nav><article>text</article></body></html>"#);
        let result = apply_exclusions(&doc, &options_with(&["nav"])).unwrap();

        assert!(result.document.select("nav").is_empty());
        assert!(doc.select("nav").exists());
    }

    #[test]
    fn test_removals_are_cumulative() {
        let doc = dom::parse(
            r#"<html><body><aside class="sidebar"><div class="widget">w</div></aside><main>m</main></body></html>"#,
        );
        let result = apply_exclusions(&doc, &options_with(&[".sidebar", ".widget"])).unwrap();

        assert_eq!(
            result.selector_results[1].outcome,
            SelectorOutcome::Unmatched
        );
        assert_eq!(result.summary.elements_removed, 1);
    }

    #[test]
    fn test_protected_roots_survive() {
        let doc = dom::parse(r#"<html><body><article>Content</article></body></html>"#);
        let result = apply_exclusions(&doc, &options_with(&["html", "body"])).unwrap();

        assert!(result.document.select("html").exists());
        assert!(result.document.select("body").exists());
        assert!(dom::clean_text(&result.document.select("body")).contains("Content"));
        assert_eq!(result.summary.selectors_failed, 2);
        assert_eq!(result.summary.elements_removed, 0);
    }

    #[test]
    fn test_too_many_selectors_is_configuration_error() {
        let selectors: Vec<String> = (0..101).map(|i| format!(".x{i}")).collect();
        let options = Options {
            exclusion_selectors: selectors,
            ..Options::default()
        };
        let doc = dom::parse("<html><body></body></html>");

        assert!(matches!(
            apply_exclusions(&doc, &options),
            Err(crate::Error::Configuration(_))
        ));
    }

    #[test]
    fn test_invalid_selector_is_not_fatal() {
        let doc = dom::parse(r#"<html><body><article>text</article><div class="ad">x</div></body></html>"#);
        let result = apply_exclusions(&doc, &options_with(&["div[", "", ".ad"])).unwrap();

        assert_eq!(result.selector_results[0].outcome, SelectorOutcome::Invalid);
        assert_eq!(result.selector_results[1].outcome, SelectorOutcome::Empty);
        assert_eq!(result.selector_results[2].outcome, SelectorOutcome::Removed(1));
        assert_eq!(result.summary.selectors_failed, 2);
    }

    #[test]
    fn test_empty_primary_content_detection() {
        let doc = dom::parse(r#"<html><body><article><div class="ad">ad</div></article></body></html>"#);
        let result = apply_exclusions(&doc, &options_with(&[".ad"])).unwrap();

        assert!(result.summary.empty_primary_content);
        assert!(result.warnings.contains(&Warning::EmptyPrimaryContent));
    }

    #[test]
    fn test_no_selectors_no_warnings() {
        let doc = dom::parse("<html><body><div>no article here</div></body></html>");
        let result = apply_exclusions(&doc, &Options::default()).unwrap();

        assert!(!result.summary.empty_primary_content);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_selector_outcome_flags() {
        assert!(SelectorOutcome::Removed(2).is_success());
        assert!(!SelectorOutcome::Unmatched.is_success());
        assert!(!SelectorOutcome::Unmatched.is_failure());
        assert!(SelectorOutcome::Invalid.is_failure());
    }
}
