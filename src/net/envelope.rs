//! Upstream response envelope.
//!
//! Every API response is either
//! `{"success": true, "cache": {...}, "data": {...}}` or
//! `{"success": false, "error": "..."}`. The `success` flag is a boolean
//! tag, so decoding goes through [`RawEnvelope`] and is converted afterwards.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

use crate::net::types::{FetchError, FetchResult};

/// Cache metadata reported by the upstream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheMeta {
    /// Upstream cache status ("hit", "miss", "awaited").
    #[serde(default)]
    pub status: String,
    /// When the upstream cached the payload (Unix epoch ms).
    #[serde(default)]
    pub cached_at: i64,
    /// Until when the payload stays valid (Unix epoch ms).
    pub cached_until: i64,
}

/// Parsed shape of an API response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope<T> {
    Success { cache: CacheMeta, data: T },
    Failure { error: String },
}

#[derive(Deserialize)]
struct RawEnvelope<T> {
    success: bool,
    cache: Option<CacheMeta>,
    data: Option<T>,
    error: Option<String>,
}

impl<T: DeserializeOwned> ResponseEnvelope<T> {
    /// Decode an envelope from raw response bytes.
    pub fn from_slice(bytes: &[u8]) -> FetchResult<Self> {
        let raw: RawEnvelope<T> = serde_json::from_slice(bytes)?;
        if !raw.success {
            return Ok(Self::Failure {
                error: raw.error.unwrap_or_default(),
            });
        }
        match (raw.cache, raw.data) {
            (Some(cache), Some(data)) => Ok(Self::Success { cache, data }),
            (None, _) => Err(missing_field("cache")),
            (_, None) => Err(missing_field("data")),
        }
    }
}

impl<T> ResponseEnvelope<T> {
    /// Expiry of a successful payload, `None` for failures.
    pub fn cached_until(&self) -> Option<i64> {
        match self {
            Self::Success { cache, .. } => Some(cache.cached_until),
            Self::Failure { .. } => None,
        }
    }

    /// Turn a failure into [`FetchError::Upstream`], prefixing the upstream message.
    pub fn into_data(self, context: &str) -> FetchResult<T> {
        match self {
            Self::Success { data, .. } => Ok(data),
            Self::Failure { error } => Err(FetchError::Upstream(format!("{context}:\n{error}"))),
        }
    }
}

/// Envelope whose payload is skipped; enough to decide cacheability.
pub type EnvelopeMeta = ResponseEnvelope<IgnoredAny>;

fn missing_field(field: &'static str) -> FetchError {
    FetchError::Parse(<serde_json::Error as serde::de::Error>::missing_field(field))
}
