//! In-memory transport for unit tests.

use bytes::Bytes;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use url::Url;

use crate::net::transport::Transport;
use crate::net::types::{Decode, FetchResult};

type Responder = Box<dyn Fn(u32, &Url) -> FetchResult<Bytes> + Send + Sync>;

/// Answers every request with `respond(call_number, url)`; call numbers start at 1.
pub(crate) struct StubTransport {
    calls: AtomicU32,
    latency: Duration,
    respond: Responder,
}

impl StubTransport {
    pub(crate) fn new(respond: impl Fn(u32, &Url) -> FetchResult<Bytes> + Send + Sync + 'static) -> Self {
        Self {
            calls: AtomicU32::new(0),
            latency: Duration::ZERO,
            respond: Box::new(respond),
        }
    }

    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for StubTransport {
    async fn fetch(&self, target: &Url, _decode: Decode) -> FetchResult<Bytes> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        (self.respond)(n, target)
    }
}

/// A success envelope wrapping `data`.
pub(crate) fn success_body(cached_until: i64, data: &str) -> Bytes {
    Bytes::from(format!(
        r#"{{"success":true,"cache":{{"status":"miss","cached_at":0,"cached_until":{cached_until}}},"data":{data}}}"#
    ))
}

/// A failure envelope.
pub(crate) fn failure_body(error: &str) -> Bytes {
    Bytes::from(format!(r#"{{"success":false,"error":"{error}"}}"#))
}
