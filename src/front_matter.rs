//! Front matter assembly and serialization.
//!
//! Fields are emitted in a fixed order, followed by configured extra fields.
//! Empty values are dropped, then every key listed in `exclude_fields` is
//! removed before the mapping is serialized as YAML between `---` fences.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};
use crate::options::Options;
use crate::result::Metadata;
use crate::source::SourceLocator;
use crate::tags::TagSet;

/// Front matter fence line.
pub const FENCE: &str = "---";

/// Everything a note's front matter is built from.
#[derive(Debug, Clone, Copy)]
pub struct NoteFields<'a> {
    pub metadata: &'a Metadata,
    pub source: &'a SourceLocator,
    pub tags: &'a TagSet,
    pub selector: &'a str,
    pub retrieved_at: DateTime<Utc>,
}

/// Build the ordered front matter mapping.
#[must_use]
pub fn build_front_matter(fields: &NoteFields<'_>, options: &Options) -> Mapping {
    let metadata = fields.metadata;
    let mut map = Mapping::new();

    insert_str(&mut map, "title", metadata.title.as_deref());
    insert_str(&mut map, "source", Some(fields.source.to_string().as_str()));
    insert_str(&mut map, "canonical_url", metadata.canonical_url.as_deref());
    insert_str(&mut map, "author", metadata.author.as_deref());
    insert_str(
        &mut map,
        "published_at",
        metadata.published_at.map(format_timestamp).as_deref(),
    );
    insert_str(&mut map, "description", metadata.description.as_deref());
    insert_list(&mut map, "keywords", &metadata.keywords);
    insert_str(&mut map, "site_name", metadata.site_name.as_deref());
    insert_list(&mut map, "tags", fields.tags.as_slice());
    insert_str(&mut map, "selector", Some(fields.selector));
    insert_str(
        &mut map,
        "retrieved_at",
        Some(format_timestamp(fields.retrieved_at).as_str()),
    );
    insert_str(&mut map, "summary", options.summary.as_deref());
    insert_str(&mut map, "archived_at", options.archived_at.as_deref());

    for (key, value) in &options.extra_fields {
        if !is_empty_value(value) {
            map.insert(Value::String(key.clone()), value.clone());
        }
    }

    for field in &options.exclude_fields {
        map.remove(field.as_str());
    }

    map
}

/// YAML between `---` fences, ending with a newline.
pub fn serialize_front_matter(front_matter: &Mapping) -> Result<String> {
    if front_matter.is_empty() {
        return Ok(format!("{FENCE}\n{FENCE}\n"));
    }
    let yaml = serde_yaml::to_string(front_matter).map_err(Error::FrontMatter)?;
    Ok(format!("{FENCE}\n{yaml}{FENCE}\n"))
}

/// Complete note text: front matter, a blank line, then the Markdown body.
pub fn render_note(front_matter: &Mapping, markdown: &str) -> Result<String> {
    let header = serialize_front_matter(front_matter)?;
    Ok(format!("{header}\n{markdown}"))
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn insert_str(map: &mut Mapping, key: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        map.insert(Value::String(key.to_string()), Value::String(value.to_string()));
    }
}

fn insert_list(map: &mut Mapping, key: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    let list = values.iter().cloned().map(Value::String).collect();
    map.insert(Value::String(key.to_string()), Value::Sequence(list));
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Sequence(items) => items.is_empty(),
        Value::Mapping(m) => m.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_metadata() -> Metadata {
        Metadata {
            title: Some("Swift Observations".to_string()),
            author: Some("Jane Doe".to_string()),
            published_at: Some(Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap()),
            keywords: vec!["swift".to_string()],
            ..Metadata::default()
        }
    }

    fn build(options: &Options) -> Mapping {
        let metadata = sample_metadata();
        let source = SourceLocator::parse("https://example.com/swift");
        let tags = TagSet::from_tags(["swift", "ios"]);
        let fields = NoteFields {
            metadata: &metadata,
            source: &source,
            tags: &tags,
            selector: "article",
            retrieved_at: Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap(),
        };
        build_front_matter(&fields, options)
    }

    fn keys(map: &Mapping) -> Vec<&str> {
        map.keys().filter_map(Value::as_str).collect()
    }

    #[test]
    fn test_field_order_and_empty_values() {
        let map = build(&Options::default());

        assert_eq!(
            keys(&map),
            vec![
                "title",
                "source",
                "author",
                "published_at",
                "keywords",
                "tags",
                "selector",
                "retrieved_at"
            ]
        );
        assert_eq!(
            map.get("published_at").and_then(Value::as_str),
            Some("2024-03-15T08:00:00Z")
        );
    }

    #[test]
    fn test_exclude_fields() {
        let options = Options {
            exclude_fields: vec!["selector".to_string(), "retrieved_at".to_string()],
            ..Options::default()
        };
        let map = build(&options);

        assert!(map.get("selector").is_none());
        assert!(map.get("retrieved_at").is_none());
        assert!(map.get("title").is_some());
    }

    #[test]
    fn test_extra_fields_and_summary() {
        let mut options = Options {
            summary: Some("Worth rereading".to_string()),
            ..Options::default()
        };
        options
            .extra_fields
            .insert("status".to_string(), Value::String("unread".to_string()));
        options.extra_fields.insert("empty".to_string(), Value::Null);

        let map = build(&options);

        assert_eq!(map.get("summary").and_then(Value::as_str), Some("Worth rereading"));
        assert_eq!(map.get("status").and_then(Value::as_str), Some("unread"));
        assert!(map.get("empty").is_none());
    }

    #[test]
    fn test_render_note() {
        let map = build(&Options::default());
        let note = render_note(&map, "# Body\n").unwrap();

        assert!(note.starts_with("---\ntitle: Swift Observations\n"));
        assert!(note.ends_with("---\n\n# Body\n"));

        let yaml = note
            .trim_start_matches("---\n")
            .split("\n---\n")
            .next()
            .unwrap();
        let parsed: Mapping = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.get("tags").and_then(Value::as_sequence).map(Vec::len), Some(2));
    }
}
