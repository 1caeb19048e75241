//! Error types for rs-capture.
//!
//! Only failures that abort a capture live here. Degraded outcomes (missing
//! metadata, unparsable dates, unmatched exclusion selectors) are reported as
//! [`Warning`](crate::Warning)s on a successful result instead.

use std::path::PathBuf;

/// Error type for capture operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No content selector produced enough text.
    #[error(
        "No selector matched content with at least {min_chars} characters (tried: {})",
        attempted.join(", ")
    )]
    NoContentMatched {
        /// Threshold that every candidate failed to reach.
        min_chars: usize,
        /// Selectors tried, in priority order.
        attempted: Vec<String>,
    },

    /// Invalid or over-limit configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Config file could not be parsed.
    #[error("Failed to parse config file {}: {source}", path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Config file exists but could not be read.
    #[error("Failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source document could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP request failed: connection, TLS, redirect or a non-success status.
    #[error("Failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response body could not be read.
    #[error("Failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// No complete response within the timeout.
    #[error("Request to {url} timed out after {seconds} seconds")]
    Timeout { url: String, seconds: u64 },

    /// Source document is larger than the configured limit.
    #[error("Content too large: {size} bytes exceeds limit of {limit} bytes")]
    SizeLimit { size: usize, limit: usize },

    /// Front matter could not be serialized.
    #[error("Failed to serialize front matter: {0}")]
    FrontMatter(#[source] serde_yaml::Error),

    /// Note could not be written to the vault.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoContentMatched { .. } => "NO_SELECTOR_MATCH",
            Self::Configuration(_) | Self::ConfigFile { .. } | Self::ConfigRead { .. } => {
                "CONFIG_ERROR"
            }
            Self::Read { .. } | Self::Http { .. } | Self::Body { .. } => "FETCH_ERROR",
            Self::Timeout { .. } => "TIMEOUT",
            Self::SizeLimit { .. } => "SIZE_LIMIT",
            Self::FrontMatter(_) | Self::Write { .. } => "WRITE_ERROR",
        }
    }

    /// Process exit code for the command-line front end.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoContentMatched { .. } => 2,
            Self::Timeout { .. } => 3,
            Self::SizeLimit { .. } => 4,
            Self::Read { .. } | Self::Http { .. } | Self::Body { .. } => 6,
            Self::FrontMatter(_) | Self::Write { .. } => 8,
            Self::Configuration(_) | Self::ConfigFile { .. } | Self::ConfigRead { .. } => 9,
        }
    }
}

/// Result type alias for capture operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_errors_have_distinct_exit_codes() {
        let no_content = Error::NoContentMatched {
            min_chars: 80,
            attempted: vec!["article".to_string()],
        };
        let config = Error::Configuration("too many selectors".to_string());

        assert_eq!(no_content.exit_code(), 2);
        assert_eq!(config.exit_code(), 9);
        assert_ne!(no_content.code(), config.code());
    }

    #[test]
    fn test_config_read_failure_is_config_error() {
        let err = Error::ConfigRead {
            path: PathBuf::from("missing.yml"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };

        assert_eq!(err.code(), "CONFIG_ERROR");
        assert_eq!(err.exit_code(), 9);
    }

    #[test]
    fn test_timeout_has_own_exit_code() {
        let err = Error::Timeout {
            url: "https://example.com/".to_string(),
            seconds: 30,
        };

        assert_eq!(err.code(), "TIMEOUT");
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("30 seconds"));
    }

    #[test]
    fn test_no_content_message_lists_selectors() {
        let err = Error::NoContentMatched {
            min_chars: 80,
            attempted: vec!["article".to_string(), "body".to_string()],
        };

        let message = err.to_string();
        assert!(message.contains("80"));
        assert!(message.contains("article, body"));
    }
}
