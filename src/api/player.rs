//! Lazily-resolved view of one player.
//!
//! Every endpoint is fetched at most once per [`Player`]; later accessors
//! reuse what earlier ones already loaded. Identity and avatar revision are
//! taken from a loaded solo record when possible, so resolving a player's
//! records does not also cost a `users/{user}` request.

use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::api::client::StatsClient;
use crate::api::query::UserQuery;
use crate::api::types::{LeagueSummary, RecordUser, SoloSummary, SummaryKind, User, UserInfo};
use crate::net::{FetchError, FetchResult, HttpTransport, Transport};

pub struct Player<T = HttpTransport> {
    client: Arc<StatsClient<T>>,
    query: UserQuery,
    user: OnceCell<User>,
    info: OnceCell<UserInfo>,
    sprint: OnceCell<SoloSummary>,
    blitz: OnceCell<SoloSummary>,
    league: OnceCell<LeagueSummary>,
}

impl<T: Transport> Player<T> {
    pub fn new(client: Arc<StatsClient<T>>, query: UserQuery) -> Self {
        Self {
            client,
            query,
            user: OnceCell::new(),
            info: OnceCell::new(),
            sprint: OnceCell::new(),
            blitz: OnceCell::new(),
            league: OnceCell::new(),
        }
    }

    pub fn query(&self) -> &UserQuery {
        &self.query
    }

    /// Canonical identity, from a loaded solo record or else from user info.
    pub async fn user(&self) -> FetchResult<&User> {
        self.user
            .get_or_try_init(|| async {
                if let Some(record_user) = self.local_record_user() {
                    return Ok(User {
                        id: record_user.id.clone(),
                        name: record_user.username.clone(),
                    });
                }
                let info = self.get_info().await?;
                Ok::<_, FetchError>(User {
                    id: info.id.clone(),
                    name: info.username.clone(),
                })
            })
            .await
    }

    pub async fn get_info(&self) -> FetchResult<&UserInfo> {
        self.info
            .get_or_try_init(|| self.client.user_info(&self.query))
            .await
    }

    pub async fn sprint(&self) -> FetchResult<&SoloSummary> {
        self.sprint
            .get_or_try_init(|| self.client.summary(&self.query, SummaryKind::Sprint))
            .await
    }

    pub async fn blitz(&self) -> FetchResult<&SoloSummary> {
        self.blitz
            .get_or_try_init(|| self.client.summary(&self.query, SummaryKind::Blitz))
            .await
    }

    pub async fn league(&self) -> FetchResult<&LeagueSummary> {
        self.league
            .get_or_try_init(|| self.client.summary(&self.query, SummaryKind::League))
            .await
    }

    /// Avatar revision, `None` when the player has no custom avatar.
    pub async fn avatar_revision(&self) -> FetchResult<Option<u64>> {
        if let Some(info) = self.info.get() {
            return Ok(info.avatar_revision);
        }
        if let Some(record_user) = self.local_record_user() {
            return Ok(record_user.avatar_revision);
        }
        Ok(self.get_info().await?.avatar_revision)
    }

    pub async fn banner_revision(&self) -> FetchResult<Option<u64>> {
        if let Some(info) = self.info.get() {
            return Ok(info.banner_revision);
        }
        if let Some(record_user) = self.local_record_user() {
            return Ok(record_user.banner_revision);
        }
        Ok(self.get_info().await?.banner_revision)
    }

    fn local_record_user(&self) -> Option<&RecordUser> {
        [self.sprint.get(), self.blitz.get()]
            .into_iter()
            .flatten()
            .find_map(|summary| summary.record.as_ref())
            .map(|record| &record.user)
    }
}
