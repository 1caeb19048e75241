//! HTML meta tag index.
//!
//! Collects `<meta>` tags once per document so every candidate lookup is a
//! map access. Keys come from `name`, `property` and `itemprop` and are
//! compared case-insensitively; the first non-empty `content` in document
//! order wins for each key.

use std::collections::HashMap;

use crate::dom::{self, Document, Selection};

/// Lower-cased meta key to first non-empty content value.
#[derive(Debug, Clone, Default)]
pub struct MetaIndex {
    entries: HashMap<String, String>,
}

impl MetaIndex {
    /// Index every `<meta>` tag of a document.
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        let mut entries = HashMap::new();

        for node in doc.select("meta[content]").nodes() {
            let meta = Selection::from(*node);
            let Some(content) = dom::get_attribute(&meta, "content") else {
                continue;
            };
            if content.trim().is_empty() {
                continue;
            }

            for attr in ["name", "property", "itemprop"] {
                if let Some(key) = dom::get_attribute(&meta, attr) {
                    let key = key.trim().to_ascii_lowercase();
                    if !key.is_empty() {
                        entries.entry(key).or_insert_with(|| content.clone());
                    }
                }
            }
        }

        Self { entries }
    }

    /// Content of the meta tag named `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
