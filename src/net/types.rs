//! Request-level types and error definitions.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Boxed error used as the cause of a transport failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while fetching an upstream resource.
///
/// This is the single error kind exposed to callers of the fetch pipeline.
/// [`FetchError::status_code`] is `Some` only for non-200 responses.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection-level failure (refused, timeout, DNS, TLS).
    #[error("request error\n{message}")]
    Transport {
        message: String,
        #[source]
        source: BoxError,
    },

    /// Upstream answered with something other than 200 OK.
    #[error("request error code: {status} {reason}\n{excerpt}")]
    Status {
        status: u16,
        reason: String,
        excerpt: String,
    },

    /// Body was not well-formed JSON, or did not match the expected shape.
    #[error("malformed response body: {0}")]
    Parse(#[from] serde_json::Error),

    /// Well-formed envelope reporting `success: false`.
    #[error("{0}")]
    Upstream(String),

    /// Target could not be turned into a request URL.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl FetchError {
    /// Build a transport error from any underlying cause.
    pub fn transport(source: impl Into<BoxError>) -> Self {
        let source = source.into();
        Self::Transport {
            message: format!("{source:?}"),
            source,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Request errors (transport and status failures) are worth another attempt.
    /// Parse errors indicate a protocol mismatch and are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transport { .. } | FetchError::Status { .. })
    }
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// How the transport should treat a 200 body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Decode {
    /// Body must parse as JSON.
    #[default]
    Json,
    /// Body is returned untouched (images, plain text).
    Raw,
}

/// Identifier for a cacheable resource.
///
/// Built from a parsed [`Url`], so equivalent spellings of the same target
/// (host case, default port, dot segments) produce equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey(Arc<str>);

impl ResourceKey {
    /// Get the normalized URL string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&Url> for ResourceKey {
    fn from(url: &Url) -> Self {
        Self(Arc::from(url.as_str()))
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equivalent_urls_share_key() {
        let a = Url::parse("HTTPS://CH.tetr.io:443/api/users/abc").unwrap();
        let b = Url::parse("https://ch.tetr.io/api/./users/abc").unwrap();
        assert_eq!(ResourceKey::from(&a), ResourceKey::from(&b));

        let c = Url::parse("https://ch.tetr.io/api/users/abd").unwrap();
        assert_ne!(ResourceKey::from(&a), ResourceKey::from(&c));
    }

    #[test]
    fn test_retryable_classification() {
        let status = FetchError::Status {
            status: 503,
            reason: "Service Unavailable".into(),
            excerpt: String::new(),
        };
        assert!(status.is_retryable());
        assert_eq!(status.status_code(), Some(503));

        let transport = FetchError::transport("connection refused");
        assert!(transport.is_retryable());
        assert_eq!(transport.status_code(), None);

        let parse = FetchError::from(serde_json::from_str::<serde_json::Value>("{").unwrap_err());
        assert!(!parse.is_retryable());

        assert!(!FetchError::Upstream("No such user!".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = FetchError::Status {
            status: 404,
            reason: "Not Found".into(),
            excerpt: "{\"success\":false}".into(),
        };
        assert_eq!(err.to_string(), "request error code: 404 Not Found\n{\"success\":false}");
    }
}
