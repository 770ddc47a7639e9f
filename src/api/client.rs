//! Typed client for the stats API.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

use crate::api::player::Player;
use crate::api::query::UserQuery;
use crate::api::types::{SummaryKind, UserInfo};
use crate::config::StatsConfig;
use crate::fetch::Fetcher;
use crate::net::{FetchError, FetchResult, HttpTransport, ResponseEnvelope, Transport};

pub(crate) const USER_INFO_CONTEXT: &str = "user info request failed";
pub(crate) const SUMMARY_CONTEXT: &str = "user summaries request failed";

/// Endpoint-level access on top of a [`Fetcher`].
#[derive(Debug)]
pub struct StatsClient<T = HttpTransport> {
    fetcher: Fetcher<T>,
    base_url: Url,
    content_url: Url,
}

impl StatsClient<HttpTransport> {
    pub fn from_config(config: &StatsConfig) -> FetchResult<Self> {
        Ok(Self::new(
            Fetcher::from_config(config)?,
            parse_base(&config.api.base_url)?,
            parse_base(&config.api.content_url)?,
        ))
    }
}

impl<T: Transport> StatsClient<T> {
    pub fn new(fetcher: Fetcher<T>, base_url: Url, content_url: Url) -> Self {
        Self {
            fetcher,
            base_url,
            content_url,
        }
    }

    /// Lazily-resolved view of one player.
    pub fn player(self: &Arc<Self>, query: UserQuery) -> Player<T> {
        Player::new(self.clone(), query)
    }

    /// `users/{user}`.
    pub async fn user_info(&self, query: &UserQuery) -> FetchResult<UserInfo> {
        let target = endpoint(&self.base_url, &["users", &query.request_param()]);
        self.get_json(&target, USER_INFO_CONTEXT).await
    }

    /// `users/{user}/summaries/{kind}`.
    pub async fn summary<D: DeserializeOwned>(&self, query: &UserQuery, kind: SummaryKind) -> FetchResult<D> {
        let target = endpoint(
            &self.base_url,
            &["users", &query.request_param(), "summaries", kind.as_path()],
        );
        self.get_json(&target, SUMMARY_CONTEXT).await
    }

    /// Avatar image bytes. Not cached.
    pub async fn avatar(&self, user_id: &str, revision: u64) -> FetchResult<Bytes> {
        let mut target = endpoint(&self.content_url, &["avatars", &format!("{user_id}.jpg")]);
        target.query_pairs_mut().append_pair("rv", &revision.to_string());
        self.fetcher.download(&target).await
    }

    /// Fetch `target` through the cache and decode its envelope.
    pub async fn get_json<D: DeserializeOwned>(&self, target: &Url, context: &str) -> FetchResult<D> {
        let body = self.fetcher.get(target).await?;
        ResponseEnvelope::<D>::from_slice(&body)?.into_data(context)
    }

    pub fn fetcher(&self) -> &Fetcher<T> {
        &self.fetcher
    }
}

fn parse_base(raw: &str) -> FetchResult<Url> {
    let url = Url::parse(raw).map_err(|e| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(FetchError::InvalidUrl {
            url: raw.to_string(),
            reason: "cannot be a base URL".to_string(),
        });
    }
    Ok(url)
}

/// Append percent-encoded path segments to `base`.
fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}
