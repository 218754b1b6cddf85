//! Error types for source operations.
//!
//! Every variant names *what* failed (field, value, operation or URL) so a host
//! can tell a site layout change apart from a network problem.

use thiserror::Error;

/// Errors produced while building requests or parsing responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// An expected element or field is absent or malformed
    #[error("failed to parse '{field}': {reason}")]
    Parse {
        /// Selector or field name that failed
        field: String,
        /// What was wrong with it
        reason: String,
    },

    /// A required value embedded in a response could not be located
    #[error("failed to extract {what}: {reason}")]
    Extraction {
        /// The embedded value that was looked for
        what: String,
        /// Why it could not be found
        reason: String,
    },

    /// The source structurally lacks the requested capability
    #[error("source '{source_id}' does not support {operation}")]
    UnsupportedOperation {
        /// Source that was asked
        source_id: String,
        /// Operation that was requested
        operation: String,
    },

    /// Transport failure reported by the network client
    #[error("request to '{url}' failed: {message}")]
    Network {
        /// Request URL
        url: String,
        /// Transport error text
        message: String,
    },

    /// A request could not be constructed
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// Why construction failed
        reason: String,
    },

    /// A JSON body did not match the expected shape
    #[error("invalid JSON from '{url}': {message}")]
    Json {
        /// Response URL
        url: String,
        /// Decoder error text
        message: String,
    },

    /// No registered source has the given id
    #[error("no source registered with id '{id}'")]
    UnknownSource {
        /// The id that was looked up
        id: String,
    },
}

impl SourceError {
    /// Creates a `Parse` error for `field`.
    #[must_use]
    pub fn parse(field: &str, reason: &str) -> Self {
        Self::Parse {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `Parse` error for an element that matched nothing.
    #[must_use]
    pub fn missing(selector: &str) -> Self {
        Self::parse(selector, "no element matched")
    }

    /// Creates an `Extraction` error.
    #[must_use]
    pub fn extraction(what: &str, reason: &str) -> Self {
        Self::Extraction {
            what: what.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates an `UnsupportedOperation` error.
    #[must_use]
    pub fn unsupported(source_id: &str, operation: &str) -> Self {
        Self::UnsupportedOperation {
            source_id: source_id.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Creates a `Network` error.
    #[must_use]
    pub fn network(url: &str, message: &str) -> Self {
        Self::Network {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    /// Creates an `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(reason: &str) -> Self {
        Self::InvalidRequest {
            reason: reason.to_string(),
        }
    }

    /// Creates a `Json` error.
    #[must_use]
    pub fn json(url: &str, message: &str) -> Self {
        Self::Json {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    /// Creates an `UnknownSource` error.
    #[must_use]
    pub fn unknown_source(id: &str) -> Self {
        Self::UnknownSource { id: id.to_string() }
    }
}

/// Result alias used across sources.
pub type Result<T> = std::result::Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_field() {
        let err = SourceError::missing("div.post-title h1");
        let msg = err.to_string();
        assert!(msg.contains("div.post-title h1"), "should contain selector");
        assert!(msg.contains("no element matched"), "should contain reason");
    }

    #[test]
    fn test_extraction_error_message() {
        let err = SourceError::extraction("manga id", "no manga_id assignment in script");
        let msg = err.to_string();
        assert!(msg.contains("manga id"));
        assert!(msg.contains("manga_id assignment"));
    }

    #[test]
    fn test_unsupported_error_message() {
        let err = SourceError::unsupported("slimeread", "image URL resolution");
        let msg = err.to_string();
        assert!(msg.contains("slimeread"));
        assert!(msg.contains("image URL resolution"));
    }

    #[test]
    fn test_network_error_message() {
        let err = SourceError::network("https://example.com/", "connection refused");
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_error_clone_preserves_message() {
        let err = SourceError::unknown_source("nope");
        assert_eq!(err.to_string(), err.clone().to_string());
    }
}
