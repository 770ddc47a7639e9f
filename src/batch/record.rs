//! Per-user lookup results.

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

use crate::api::{InvalidUser, Rank, User};
use crate::net::FetchError;

/// One resolved line of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    /// 1-based position in the input.
    pub index: usize,
    pub user: User,
    pub rank: Rank,
    pub tr: f64,
    /// Best 40 lines time in milliseconds.
    pub sprint_ms: Option<f64>,
    #[serde(skip)]
    pub avatar: Option<Bytes>,
}

impl UserRecord {
    /// Sprint time as `45.123s` or `1m 5.123s`, `N/A` without a record.
    pub fn sprint_display(&self) -> String {
        let Some(ms) = self.sprint_ms else {
            return "N/A".to_string();
        };
        let secs = ms / 1000.0;
        if secs < 60.0 {
            format!("{secs:.3}s")
        } else {
            format!("{:.0}m {:.3}s", (secs / 60.0).floor(), secs % 60.0)
        }
    }

    pub fn display_name(&self) -> String {
        self.user.name.to_uppercase()
    }
}

/// Why one line of a batch produced no record.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidUser),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("lookup cancelled by shutdown")]
    Cancelled,

    #[error("lookup task aborted: {0}")]
    Aborted(String),
}

impl LookupError {
    /// Request errors may succeed on a later attempt; everything else is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LookupError::Fetch(e) if e.is_retryable())
    }
}
