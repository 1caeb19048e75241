//! JSON-LD structured data.
//!
//! Reads Schema.org objects from `<script type="application/ld+json">`
//! blocks. Nested objects, arrays and `@graph` containers are flattened in
//! document order; article-typed objects are consulted before the rest.

use serde_json::{Map, Value};

use crate::dom::{Document, Selection};
use crate::patterns::KEYWORD_DELIMITER;

const ARTICLE_TYPES: &[&str] = &[
    "article",
    "newsarticle",
    "blogposting",
    "techarticle",
    "scholarlyarticle",
    "report",
    "webpage",
];

const PUBLISHER_TYPES: &[&str] = &["organization", "newsmediaorganization", "website"];

/// Field readable from JSON-LD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonLdField {
    Author,
    DatePublished,
    Description,
    Publisher,
}

impl JsonLdField {
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::DatePublished => "datePublished",
            Self::Description => "description",
            Self::Publisher => "publisher",
        }
    }
}

/// Typed Schema.org objects found in a document.
#[derive(Debug, Clone, Default)]
pub struct JsonLd {
    objects: Vec<Map<String, Value>>,
}

impl JsonLd {
    /// Parse every JSON-LD block; malformed blocks are skipped.
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        let mut objects = Vec::new();

        for node in doc.select(r#"script[type="application/ld+json"]"#).nodes() {
            let script = Selection::from(*node);
            let text = script.text();
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            match serde_json::from_str::<Value>(text) {
                Ok(value) => collect_objects(&value, &mut objects),
                Err(err) => tracing::debug!(error = %err, "skipping malformed JSON-LD block"),
            }
        }

        Self { objects }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// First non-empty value of `field`, article objects first.
    #[must_use]
    pub fn get(&self, field: JsonLdField) -> Option<String> {
        let from_key = self
            .by_priority()
            .find_map(|obj| obj.get(field.key()).and_then(|v| value_text(v, field)));

        match field {
            JsonLdField::Publisher => from_key.or_else(|| {
                self.objects
                    .iter()
                    .filter(|obj| has_type(obj, PUBLISHER_TYPES))
                    .find_map(|obj| obj.get("name").and_then(Value::as_str).and_then(non_empty))
            }),
            _ => from_key,
        }
    }

    /// Keywords of the first object declaring any.
    #[must_use]
    pub fn keywords(&self) -> Vec<String> {
        self.by_priority()
            .find_map(|obj| {
                let keywords: Vec<String> = match obj.get("keywords")? {
                    Value::String(s) => KEYWORD_DELIMITER
                        .split(s)
                        .filter_map(non_empty)
                        .collect(),
                    Value::Array(items) => items
                        .iter()
                        .filter_map(Value::as_str)
                        .filter_map(non_empty)
                        .collect(),
                    _ => Vec::new(),
                };
                (!keywords.is_empty()).then_some(keywords)
            })
            .unwrap_or_default()
    }

    fn by_priority(&self) -> impl Iterator<Item = &Map<String, Value>> {
        let articles = self.objects.iter().filter(|obj| has_type(obj, ARTICLE_TYPES));
        let others = self.objects.iter().filter(|obj| !has_type(obj, ARTICLE_TYPES));
        articles.chain(others)
    }
}

fn collect_objects(value: &Value, out: &mut Vec<Map<String, Value>>) {
    match value {
        Value::Object(map) => {
            if map.contains_key("@type") {
                out.push(map.clone());
            }
            for (key, child) in map {
                if key == "@graph" || child.is_object() || child.is_array() {
                    collect_objects(child, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_objects(item, out);
            }
        }
        _ => {}
    }
}

fn has_type(obj: &Map<String, Value>, wanted: &[&str]) -> bool {
    let matches = |s: &str| wanted.contains(&s.to_ascii_lowercase().as_str());
    match obj.get("@type") {
        Some(Value::String(s)) => matches(s),
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).any(matches),
        _ => false,
    }
}

/// Text of a property value: strings as-is, people and organizations by name.
fn value_text(value: &Value, field: JsonLdField) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s),
        Value::Object(obj) => person_name(obj),
        Value::Array(items) if field == JsonLdField::Author => {
            let names: Vec<String> = items
                .iter()
                .filter_map(|item| value_text(item, field))
                .collect();
            (!names.is_empty()).then(|| names.join(", "))
        }
        Value::Array(items) => items.iter().find_map(|item| value_text(item, field)),
        _ => None,
    }
}

fn person_name(obj: &Map<String, Value>) -> Option<String> {
    if let Some(name) = obj.get("name").and_then(Value::as_str).and_then(non_empty) {
        return Some(name);
    }

    let given = obj.get("givenName").and_then(Value::as_str).unwrap_or("");
    let family = obj.get("familyName").and_then(Value::as_str).unwrap_or("");
    non_empty(&format!("{} {}", given.trim(), family.trim()))
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;

    fn json_ld(body: &str) -> JsonLd {
        JsonLd::from_document(&dom::parse(&format!(
            r#"<html><head><script type="application/ld+json">{body}</script></head><body></body></html>"#
        )))
    }

    #[test]
    fn test_article_fields() {
        let data = json_ld(
            r#"{
                "@context": "https://schema.org",
                "@type": "NewsArticle",
                "headline": "Test",
                "description": "Summary from schema",
                "datePublished": "2024-03-15T10:00:00Z",
                "author": {"@type": "Person", "name": "Jane Doe"},
                "publisher": {"@type": "Organization", "name": "Daily Planet"},
                "keywords": "rust, parsing"
            }"#,
        );

        assert_eq!(data.get(JsonLdField::Author), Some("Jane Doe".to_string()));
        assert_eq!(data.get(JsonLdField::Description), Some("Summary from schema".to_string()));
        assert_eq!(data.get(JsonLdField::DatePublished), Some("2024-03-15T10:00:00Z".to_string()));
        assert_eq!(data.get(JsonLdField::Publisher), Some("Daily Planet".to_string()));
        assert_eq!(data.keywords(), vec!["rust", "parsing"]);
    }

    #[test]
    fn test_graph_and_multiple_authors() {
        let data = json_ld(
            r#"{"@graph": [
                {"@type": "WebSite", "name": "Example Site"},
                {"@type": "BlogPosting", "author": [
                    {"@type": "Person", "givenName": "Ada", "familyName": "Lovelace"},
                    {"@type": "Person", "name": "Alan Turing"}
                ], "keywords": ["math", "computing"]}
            ]}"#,
        );

        assert_eq!(
            data.get(JsonLdField::Author),
            Some("Ada Lovelace, Alan Turing".to_string())
        );
        assert_eq!(data.get(JsonLdField::Publisher), Some("Example Site".to_string()));
        assert_eq!(data.keywords(), vec!["math", "computing"]);
    }

    #[test]
    fn test_malformed_block_is_skipped() {
        let data = json_ld("{ not json");
        assert!(data.is_empty());
        assert_eq!(data.get(JsonLdField::Author), None);
    }
}
