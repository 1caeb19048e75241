//! Selector engine integration tests
//!
//! Priority order, the character threshold, invalid selectors and the
//! no-content failure.

#![allow(clippy::expect_used)]

use rs_capture::dom;
use rs_capture::selector::{select_content, SelectorSpec};
use rs_capture::{Error, Warning};

fn spec(selectors: &[&str], min: usize) -> SelectorSpec {
    SelectorSpec::new(selectors.iter().map(|s| (*s).to_string()).collect(), min)
}

#[test]
fn earlier_selector_wins_over_document_order() {
    let html = format!(
        "<html><body><div class=\"content\">{}</div><article>{}</article></body></html>",
        "first in document ".repeat(10),
        "first in priority ".repeat(10)
    );
    let doc = dom::parse(&html);
    let mut warnings = Vec::new();

    let result = select_content(&doc, &spec(&["article", ".content"], 80), &mut warnings)
        .expect("expected Ok(_)");

    assert_eq!(result.selector, "article");
    assert!(result.text.starts_with("first in priority"));
    assert!(result.html_fragment.starts_with("<article>"));
    assert!(warnings.is_empty());
}

#[test]
fn later_match_of_same_selector_can_qualify() {
    let html = format!(
        "<html><body><article>teaser</article><article>{}</article></body></html>",
        "long body text ".repeat(10)
    );
    let doc = dom::parse(&html);
    let mut warnings = Vec::new();

    let result =
        select_content(&doc, &spec(&["article"], 80), &mut warnings).expect("expected Ok(_)");

    assert!(result.text.starts_with("long body text"));
    assert_eq!(result.attempted_selectors, vec!["article"]);
}

#[test]
fn threshold_is_inclusive_and_counts_normalized_chars() {
    // 10 characters after whitespace collapsing, 18 raw.
    let doc = dom::parse("<html><body><article>  abcd    efghi \n </article></body></html>");
    let mut warnings = Vec::new();

    let exact = select_content(&doc, &spec(&["article"], 10), &mut warnings)
        .expect("expected Ok(_)");
    assert_eq!(exact.character_count, 10);
    assert_eq!(exact.text, "abcd efghi");

    let err = select_content(&doc, &spec(&["article"], 11), &mut warnings)
        .expect_err("expected Err(_)");
    assert!(matches!(err, Error::NoContentMatched { min_chars: 11, .. }));
}

#[test]
fn character_count_uses_unicode_scalars() {
    let doc = dom::parse("<html><body><main>日本語のテキスト</main></body></html>");
    let mut warnings = Vec::new();

    let result =
        select_content(&doc, &spec(&["main"], 8), &mut warnings).expect("expected Ok(_)");
    assert_eq!(result.character_count, 8);
}

#[test]
fn invalid_selector_is_skipped_with_warning() {
    let html = format!("<html><body><main>{}</main></body></html>", "x".repeat(100));
    let doc = dom::parse(&html);
    let mut warnings = Vec::new();

    let result = select_content(&doc, &spec(&["article[", "main"], 80), &mut warnings)
        .expect("expected Ok(_)");

    assert_eq!(result.selector, "main");
    assert_eq!(result.attempted_selectors, vec!["article[", "main"]);
    assert_eq!(
        warnings,
        vec![Warning::ContentSelectorInvalid {
            selector: "article[".to_string()
        }]
    );
}

#[test]
fn no_qualifying_content_lists_every_attempt() {
    let doc = dom::parse("<html><body><article>tiny</article><p>also tiny</p></body></html>");
    let mut warnings = Vec::new();

    let err = select_content(&doc, &spec(&["article", "main", "body"], 80), &mut warnings)
        .expect_err("expected Err(_)");

    match err {
        Error::NoContentMatched {
            min_chars,
            ref attempted,
        } => {
            assert_eq!(min_chars, 80);
            assert_eq!(*attempted, vec!["article", "main", "body"]);
        }
        ref other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.code(), "NO_SELECTOR_MATCH");
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn selector_list_over_cap_is_configuration_error() {
    let doc = dom::parse("<html><body></body></html>");
    let mut spec = spec(&["article", "main", "body"], 1);
    spec.max_selectors = 2;

    let err = select_content(&doc, &spec, &mut Vec::new()).expect_err("expected Err(_)");
    assert!(matches!(err, Error::Configuration(_)));
}
