//! The fetcher: cache in front of retry, rate limiting and transport.

use bytes::Bytes;
use url::Url;

use crate::cache::ResponseCache;
use crate::config::StatsConfig;
use crate::net::{Decode, FetchError, FetchResult, HttpTransport, ResourceKey, Transport};
use crate::resilience::{RateLimiter, RetryPolicy};

/// Cached, rate-limited, retrying access to the upstream API.
#[derive(Debug)]
pub struct Fetcher<T = HttpTransport> {
    transport: T,
    limiter: RateLimiter,
    retry: RetryPolicy,
    cache: ResponseCache,
}

impl Fetcher<HttpTransport> {
    /// Build the HTTP-backed pipeline from configuration.
    pub fn from_config(config: &StatsConfig) -> FetchResult<Self> {
        let transport = HttpTransport::new(&config.transport)?;
        Ok(Self::new(
            transport,
            RateLimiter::from_config(&config.rate_limit),
            RetryPolicy::from_config(&config.retries),
            ResponseCache::new(),
        ))
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, limiter: RateLimiter, retry: RetryPolicy, cache: ResponseCache) -> Self {
        tracing::debug!(
            interval_ms = limiter.interval().as_millis() as u64,
            max_attempts = retry.max_attempts(),
            "Fetcher initialized"
        );
        Self {
            transport,
            limiter,
            retry,
            cache,
        }
    }

    /// Raw JSON body for `target`, from cache when still valid.
    ///
    /// Failure envelopes are returned as bytes too; deciding what they mean
    /// is up to the caller.
    pub async fn get(&self, target: &Url) -> FetchResult<Bytes> {
        let key = ResourceKey::from(target);
        self.cache
            .get_or_fetch(&key, || self.retrieve(target, Decode::Json))
            .await
    }

    /// Raw body for `target` (no JSON check), bypassing the cache.
    pub async fn download(&self, target: &Url) -> FetchResult<Bytes> {
        self.retrieve(target, Decode::Raw).await
    }

    /// One logical retrieval: every attempt waits for the rate limiter.
    async fn retrieve(&self, target: &Url, decode: Decode) -> FetchResult<Bytes> {
        let limiter = &self.limiter;
        let transport = &self.transport;
        self.retry
            .run_if(
                move || async move {
                    limiter.acquire().await;
                    transport.fetch(target, decode).await
                },
                FetchError::is_retryable,
            )
            .await
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
