//! Configuration options for a capture.
//!
//! The `Options` struct is an immutable value passed into every component
//! call. It deserializes from YAML, with every field optional and falling
//! back to its default.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File name looked up in the home directory by [`Options::discover`].
pub const DEFAULT_CONFIG_FILE: &str = ".rs-capture.yml";

/// Configuration options for a capture.
///
/// # Example
///
/// ```rust
/// use rs_capture::Options;
///
/// let options = Options {
///     selectors: vec!["article".to_string(), "body".to_string()],
///     exclusion_selectors: vec![".ads".to_string()],
///     ..Options::default()
/// };
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Ordered content selectors; the first qualifying match wins.
    ///
    /// Default: `article`, `main`, `[role="main"]`, common content classes, `body`
    pub selectors: Vec<String>,

    /// Minimum trimmed character count for a selector match to qualify.
    ///
    /// Default: `80`
    pub min_content_chars: usize,

    /// Upper bound on both the content and the exclusion selector lists.
    ///
    /// Default: `100`
    pub max_selectors: usize,

    /// Selectors whose matches are detached before content selection.
    ///
    /// Default: empty
    pub exclusion_selectors: Vec<String>,

    /// Elements checked for surviving text after exclusion.
    ///
    /// Default: `article`, `main`, `[role="main"]`
    pub primary_content_selectors: Vec<String>,

    /// Removal ratio above which a high-removal warning is raised.
    ///
    /// Default: `0.4`
    pub high_removal_ratio: f64,

    /// Maximum slug length, excluding the `.md` extension.
    ///
    /// Default: `80`
    pub max_filename_length: usize,

    /// Tags always added to the note.
    pub tags: Vec<String>,

    /// Front matter keys removed before serialization.
    pub exclude_fields: Vec<String>,

    /// Replace an existing note instead of suffixing the filename.
    ///
    /// Default: `false`
    pub overwrite: bool,

    /// Folder below the date bucket.
    pub subfolder: Option<String>,

    /// Fixed summary copied into front matter.
    pub summary: Option<String>,

    /// Fixed archive timestamp copied into front matter.
    pub archived_at: Option<String>,

    /// Vault root directory.
    pub vault: Option<PathBuf>,

    /// Unrecognized keys, copied verbatim into front matter.
    #[serde(flatten)]
    pub extra_fields: BTreeMap<String, serde_yaml::Value>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            selectors: [
                "article",
                "main",
                "[role=\"main\"]",
                ".content",
                ".post-content",
                ".entry-content",
                ".article-content",
                "body",
            ]
            .map(String::from)
            .to_vec(),
            min_content_chars: 80,
            max_selectors: 100,
            exclusion_selectors: Vec::new(),
            primary_content_selectors: ["article", "main", "[role=\"main\"]"]
                .map(String::from)
                .to_vec(),
            high_removal_ratio: 0.4,
            max_filename_length: 80,
            tags: Vec::new(),
            exclude_fields: Vec::new(),
            overwrite: false,
            subfolder: None,
            summary: None,
            archived_at: None,
            vault: None,
            extra_fields: BTreeMap::new(),
        }
    }
}

impl Options {
    /// Parse options from a YAML document and validate them.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let options: Self = serde_yaml::from_str(yaml).map_err(|source| Error::ConfigFile {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a YAML file and validate them.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        if content.trim().is_empty() {
            return Err(Error::Configuration(format!(
                "config file {} is empty",
                path.display()
            )));
        }

        let options: Self = serde_yaml::from_str(&content).map_err(|source| Error::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        options.validate()?;

        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(options)
    }

    /// Load `~/.rs-capture.yml` if it exists, otherwise return defaults.
    pub fn discover() -> Result<Self> {
        match dirs::home_dir().map(|home| home.join(DEFAULT_CONFIG_FILE)) {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Check invariants that every component relies on.
    pub fn validate(&self) -> Result<()> {
        if self.selectors.is_empty() {
            return Err(Error::Configuration(
                "at least one selector must be specified".to_string(),
            ));
        }

        if let Some(blank) = self.selectors.iter().find(|s| s.trim().is_empty()) {
            return Err(Error::Configuration(format!("invalid selector: {blank:?}")));
        }

        check_selector_cap("selectors", self.selectors.len(), self.max_selectors)?;
        check_selector_cap(
            "exclusion_selectors",
            self.exclusion_selectors.len(),
            self.max_selectors,
        )?;

        if self.min_content_chars < 1 {
            return Err(Error::Configuration(
                "min_content_chars must be at least 1".to_string(),
            ));
        }

        if self.max_filename_length < 8 {
            return Err(Error::Configuration(
                "max_filename_length must be at least 8".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.high_removal_ratio) {
            return Err(Error::Configuration(format!(
                "high_removal_ratio must be between 0 and 1, got {}",
                self.high_removal_ratio
            )));
        }

        if let Some(ref subfolder) = self.subfolder {
            validate_subfolder(subfolder)?;
        }

        Ok(())
    }
}

/// Reject lists longer than the configured cap.
pub(crate) fn check_selector_cap(name: &str, count: usize, max: usize) -> Result<()> {
    if count > max {
        return Err(Error::Configuration(format!(
            "too many {name}: {count} provided, limit is {max}"
        )));
    }
    Ok(())
}

/// Subfolders must stay inside the vault.
fn validate_subfolder(subfolder: &str) -> Result<()> {
    let normalized = subfolder.replace('\\', "/");
    let unsafe_segment = normalized
        .split('/')
        .any(|part| part.trim().is_empty() || part.starts_with('.'));

    if normalized.contains("..") || unsafe_segment {
        return Err(Error::Configuration(format!(
            "invalid subfolder path: {subfolder}"
        )));
    }
    Ok(())
}
