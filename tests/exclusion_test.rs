//! Exclusion filter integration tests
//!
//! Cumulative removal, root protection, selector limits and the advisory
//! warnings surfaced alongside a successful result.

#![allow(clippy::expect_used)]

use rs_capture::dom;
use rs_capture::exclusion::{apply_exclusions, SelectorOutcome};
use rs_capture::{Error, Options, Warning};

fn options(selectors: &[&str]) -> Options {
    Options {
        exclusion_selectors: selectors.iter().map(|s| (*s).to_string()).collect(),
        ..Options::default()
    }
}

#[test]
fn html_and_body_survive_root_selectors() {
    let doc = dom::parse(
        r#"<html><body><article><p>Article body text that must survive.</p></article></body></html>"#,
    );

    let result = apply_exclusions(&doc, &options(&["html", "body", "html > body"]))
        .expect("expected Ok(_)");

    assert!(result.document.select("html").exists());
    assert!(result.document.select("body").exists());
    assert!(dom::clean_text(&result.document.select("body")).contains("must survive"));
    assert!(result
        .selector_results
        .iter()
        .all(|r| r.outcome == SelectorOutcome::ProtectedOnly));
}

#[test]
fn mixed_selector_removes_children_but_keeps_body() {
    let doc = dom::parse(r#"<html><body><div class="x">ad</div><article>keep</article></body></html>"#);

    let result = apply_exclusions(&doc, &options(&["body, .x"])).expect("expected Ok(_)");

    assert!(result.document.select(".x").is_empty());
    assert!(result.document.select("body").exists());
    assert_eq!(result.summary.elements_removed, 1);
}

#[test]
fn over_limit_selector_list_is_rejected_before_mutation() {
    let doc = dom::parse(r#"<html><body><div class="x0">text</div></body></html>"#);
    let opts = Options {
        exclusion_selectors: (0..101).map(|i| format!(".x{i}")).collect(),
        ..Options::default()
    };

    let err = apply_exclusions(&doc, &opts).err().expect("expected Err(_)");
    assert!(matches!(err, Error::Configuration(_)));
    assert_eq!(err.exit_code(), 9);
    assert!(doc.select(".x0").exists());
}

#[test]
fn exactly_max_selectors_is_accepted() {
    let doc = dom::parse("<html><body><article>text</article></body></html>");
    let opts = Options {
        exclusion_selectors: (0..100).map(|i| format!(".x{i}")).collect(),
        ..Options::default()
    };

    let result = apply_exclusions(&doc, &opts).expect("expected Ok(_)");
    assert_eq!(result.summary.selectors_attempted, 100);
    assert_eq!(result.summary.selectors_matched, 0);
}

#[test]
fn high_removal_warning_is_advisory() {
    let doc = dom::parse(
        r#"<html><head></head><body>
            <div class="junk"><span>a</span><span>b</span><span>c</span></div>
            <article>Kept article text</article>
        </body></html>"#,
    );

    let result = apply_exclusions(&doc, &options(&[".junk", "span"])).expect("expected Ok(_)");

    // html, head, body, div, 3 spans, article
    assert_eq!(result.summary.total_elements, 8);
    assert_eq!(result.summary.elements_removed, 1);
    assert!(!result.summary.high_removal);

    let heavy = apply_exclusions(&doc, &options(&["span", ".junk", "head"])).expect("expected Ok(_)");
    assert_eq!(heavy.summary.elements_removed, 5);
    assert!(heavy.summary.high_removal);
    assert!(heavy
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::HighRemoval { removed: 5, total: 8, .. })));
    assert!(heavy.document.select("article").exists());
}

#[test]
fn unmatched_and_invalid_selectors_are_reported() {
    let doc = dom::parse("<html><body><main>content</main></body></html>");

    let result = apply_exclusions(&doc, &options(&[".missing", "p[[", ""])).expect("expected Ok(_)");

    assert_eq!(result.summary.selectors_failed, 2);
    assert!(result.warnings.contains(&Warning::ExclusionSelectorUnmatched {
        selector: ".missing".to_string()
    }));
    assert_eq!(
        result
            .warnings
            .iter()
            .filter(|w| matches!(w, Warning::ExclusionSelectorFailed { .. }))
            .count(),
        2
    );
}

#[test]
fn empty_primary_content_after_exclusion() {
    let doc = dom::parse(
        r#"<html><body><main><div class="promo">Subscribe!</div></main><div>other</div></body></html>"#,
    );

    let result = apply_exclusions(&doc, &options(&[".promo"])).expect("expected Ok(_)");
    assert!(result.summary.empty_primary_content);

    let doc = dom::parse(
        r#"<html><body><main><p>Real text</p><div class="promo">Subscribe!</div></main></body></html>"#,
    );
    let result = apply_exclusions(&doc, &options(&[".promo"])).expect("expected Ok(_)");
    assert!(!result.summary.empty_primary_content);
}
