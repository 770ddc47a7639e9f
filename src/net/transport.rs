//! Single-shot HTTP GET transport.
//!
//! # Responsibilities
//! - Issue one GET per call and read the whole body
//! - Reject anything but 200 OK with a status error carrying a body excerpt
//! - Optionally check the body is well-formed JSON
//! - Map connection-level failures to [`FetchError::Transport`]
//!
//! No retries and no rate limiting happen here; see `resilience`.

use bytes::Bytes;
use reqwest::{Client, Proxy, StatusCode};
use serde::de::IgnoredAny;
use std::future::Future;
use std::time::{Duration, Instant};
use url::Url;

use crate::config::TransportConfig;
use crate::net::types::{Decode, FetchError, FetchResult};
use crate::observability::metrics;

/// Longest body excerpt carried by a status error, in bytes.
const EXCERPT_LIMIT: usize = 512;

/// Something that can GET a remote resource.
pub trait Transport: Send + Sync {
    /// Fetch `target` and return its full body.
    fn fetch(&self, target: &Url, decode: Decode) -> impl Future<Output = FetchResult<Bytes>> + Send;
}

/// [`Transport`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport from configuration.
    pub fn new(config: &TransportConfig) -> FetchResult<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone());

        if let Some(proxy) = &config.proxy {
            let proxy = Proxy::all(proxy.as_str()).map_err(|e| FetchError::InvalidUrl {
                url: proxy.clone(),
                reason: e.to_string(),
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(FetchError::transport)?;
        tracing::debug!(proxy = ?config.proxy, timeout_secs = config.timeout_secs, "HTTP transport ready");
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn fetch(&self, target: &Url, decode: Decode) -> FetchResult<Bytes> {
        let start = Instant::now();

        let response = match self.client.get(target.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(url = %target, error = %e, "Upstream unreachable");
                metrics::record_upstream_request("error", start);
                return Err(FetchError::transport(e));
            }
        };

        let status = response.status();
        let body = response.bytes().await.map_err(FetchError::transport)?;
        metrics::record_upstream_request(status.as_str(), start);

        if status != StatusCode::OK {
            tracing::debug!(url = %target, status = %status, "Upstream returned non-OK status");
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                excerpt: excerpt(&body),
            });
        }

        if decode == Decode::Json {
            serde_json::from_slice::<IgnoredAny>(&body)?;
        }

        Ok(body)
    }
}

/// Human-readable prefix of a body, cut on a char boundary.
fn excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= EXCERPT_LIMIT {
        return text.into_owned();
    }
    let mut end = EXCERPT_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
