//! Batch user lookups.
//!
//! # Data Flow
//! ```text
//! inputs ──spawn per line──▶ RetryPolicy::run_if(lookup_one)  ┐
//!                            select! against Shutdown         ├─▶ results in input order
//!                            metrics + completion log         ┘
//! ```
//!
//! Only request errors (transport and HTTP status) are retried per line. An
//! upstream `success: false` reply, such as an unknown user, fails its line
//! on the first attempt.
//!
//! One failing line never affects the others. Every request still passes
//! through the shared client, so the whole batch respects one rate limit
//! and shares one cache.

pub mod record;

use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::api::{StatsClient, UserQuery};
use crate::config::BatchConfig;
use crate::lifecycle::Shutdown;
use crate::net::Transport;
use crate::observability::metrics;
use crate::resilience::RetryPolicy;

pub use record::{LookupError, UserRecord};

/// Resolve one input line into a record.
pub async fn lookup_one<T: Transport>(
    client: &Arc<StatsClient<T>>,
    index: usize,
    input: &str,
    avatars: bool,
) -> Result<UserRecord, LookupError> {
    let query: UserQuery = input.parse()?;
    let player = client.player(query);

    let (user, league, sprint, avatar_revision) = tokio::try_join!(
        player.user(),
        player.league(),
        player.sprint(),
        player.avatar_revision(),
    )?;

    let avatar = match avatar_revision {
        Some(revision) if avatars => Some(client.avatar(&user.id, revision).await?),
        _ => None,
    };

    Ok(UserRecord {
        index,
        user: user.clone(),
        rank: league.rank,
        tr: league.tr,
        sprint_ms: sprint.record.as_ref().and_then(|r| r.results.stats.finaltime),
        avatar,
    })
}

/// Look up every input concurrently. Results keep input order.
pub async fn lookup_all<T: Transport + 'static>(
    client: Arc<StatsClient<T>>,
    inputs: Vec<String>,
    config: &BatchConfig,
    shutdown: &Shutdown,
) -> Vec<Result<UserRecord, LookupError>> {
    let batch_id = Uuid::new_v4();
    let policy = RetryPolicy::new(config.max_attempts);
    tracing::info!(%batch_id, users = inputs.len(), "Starting batch lookup");

    let handles: Vec<_> = inputs
        .into_iter()
        .enumerate()
        .map(|(i, input)| {
            let index = i + 1;
            let client = client.clone();
            let policy = policy.clone();
            let shutdown = shutdown.clone();
            let avatars = config.avatars;
            let span = tracing::info_span!("lookup", %batch_id, index, input = %input);

            tokio::spawn(
                async move {
                    let result = tokio::select! {
                        biased;
                        _ = shutdown.cancelled() => Err(LookupError::Cancelled),
                        result = policy.run_if(
                            || lookup_one(&client, index, &input, avatars),
                            LookupError::is_retryable,
                        ) => result,
                    };

                    metrics::record_lookup(result.is_ok());
                    match &result {
                        Ok(record) => tracing::info!(user = %record.display_name(), "Lookup complete"),
                        Err(e) => tracing::warn!(error = %e, "Lookup failed"),
                    }
                    result
                }
                .instrument(span),
            )
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(match handle.await {
            Ok(result) => result,
            Err(e) => Err(LookupError::Aborted(e.to_string())),
        });
    }

    let failed = results.iter().filter(|r| r.is_err()).count();
    tracing::info!(%batch_id, failed, "Batch lookup finished");
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResponseCache;
    use crate::fetch::Fetcher;
    use crate::net::stub::{failure_body, success_body, StubTransport};
    use crate::net::{FetchError, FetchResult};
    use crate::resilience::RateLimiter;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use url::Url;

    fn id_of(name: &str) -> String {
        format!("{:0>24}", name.len())
    }

    /// Every user exists except `nobody`; names longer than 4 characters answer slower.
    fn respond(_: u32, url: &Url) -> FetchResult<Bytes> {
        let segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();
        let name = segments.get(2).copied().unwrap_or_default();
        if name == "nobody" {
            return Ok(failure_body("No such user!"));
        }
        let id = id_of(name);
        let data = match segments.get(4).copied() {
            None => format!(r#"{{"_id":"{id}","username":"{name}","avatar_revision":2}}"#),
            Some("40l") => format!(
                r#"{{"record":{{"user":{{"id":"{id}","username":"{name}","avatar_revision":2}},"results":{{"stats":{{"finaltime":45123.4}}}}}},"rank":1,"rank_local":1}}"#
            ),
            Some("league") => r#"{"tr":20000.0,"rank":"s+"}"#.to_string(),
            Some(other) => panic!("unexpected summary {other}"),
        };
        Ok(success_body(i64::MAX, &data))
    }

    fn client(transport: StubTransport) -> Arc<StatsClient<StubTransport>> {
        Arc::new(StatsClient::new(
            Fetcher::new(
                transport,
                RateLimiter::new(Duration::ZERO),
                RetryPolicy::new(1),
                ResponseCache::new(),
            ),
            Url::parse("https://ch.tetr.io/api/").unwrap(),
            Url::parse("https://tetr.io/user-content/").unwrap(),
        ))
    }

    fn inputs(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_results_in_input_order_with_isolated_failures() {
        let client = client(StubTransport::new(respond));
        let results = lookup_all(
            client,
            inputs(&["alpha", "no way!", "nobody", "bob"]),
            &BatchConfig::default(),
            &Shutdown::new(),
        )
        .await;

        assert_eq!(results.len(), 4);
        let first = results[0].as_ref().unwrap();
        assert_eq!((first.index, first.user.name.as_str()), (1, "alpha"));
        assert_eq!(first.sprint_display(), "45.123s");
        assert!(matches!(results[1], Err(LookupError::InvalidInput(_))));
        assert!(matches!(results[2], Err(LookupError::Fetch(FetchError::Upstream(_)))));
        assert_eq!(results[3].as_ref().unwrap().index, 4);
    }

    #[tokio::test]
    async fn test_request_errors_retried_per_user() {
        let failed_once = Arc::new(AtomicBool::new(false));
        let flag = failed_once.clone();
        let client = client(StubTransport::new(move |n, url| {
            if url.path().ends_with("/league") && !flag.swap(true, Ordering::SeqCst) {
                return Err(FetchError::Status {
                    status: 503,
                    reason: "Service Unavailable".into(),
                    excerpt: String::new(),
                });
            }
            respond(n, url)
        }));

        let results = lookup_all(client, inputs(&["alpha"]), &BatchConfig::default(), &Shutdown::new()).await;
        assert!(results[0].is_ok());
        assert!(failed_once.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_upstream_failure_not_retried() {
        // Latency keeps every request of an attempt in flight before the first fails.
        let client = client(StubTransport::new(respond).with_latency(Duration::from_millis(5)));

        let results = lookup_all(client.clone(), inputs(&["nobody"]), &BatchConfig::default(), &Shutdown::new()).await;
        assert!(matches!(results[0], Err(LookupError::Fetch(FetchError::Upstream(_)))));
        // One attempt: user info, league and 40l.
        assert_eq!(client.fetcher().transport().calls(), 3);
    }

    #[tokio::test]
    async fn test_avatar_downloaded_when_enabled() {
        let client = client(StubTransport::new(|n, url| {
            if url.path().starts_with("/user-content/avatars/") {
                assert_eq!(url.query(), Some("rv=2"));
                return Ok(Bytes::from_static(b"jpeg"));
            }
            respond(n, url)
        }));
        let config = BatchConfig {
            avatars: true,
            ..BatchConfig::default()
        };

        let results = lookup_all(client, inputs(&["alpha"]), &config, &Shutdown::new()).await;
        assert_eq!(results[0].as_ref().unwrap().avatar, Some(Bytes::from_static(b"jpeg")));
    }

    #[tokio::test]
    async fn test_avatar_skipped_by_default() {
        let client = client(StubTransport::new(respond));
        let record = lookup_one(&client, 1, "alpha", false).await.unwrap();
        assert!(record.avatar.is_none());
        assert_eq!(record.rank, crate::api::Rank::SPlus);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_pending_lookups() {
        let client = client(StubTransport::new(respond).with_latency(Duration::from_secs(60)));
        let shutdown = Shutdown::new();

        let trigger = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                shutdown.trigger();
            })
        };

        let results = lookup_all(client, inputs(&["alpha", "bob"]), &BatchConfig::default(), &shutdown).await;
        trigger.await.unwrap();
        assert!(results.iter().all(|r| matches!(r, Err(LookupError::Cancelled))));
    }
}
