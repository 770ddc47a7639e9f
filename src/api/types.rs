//! Typed payloads of the user endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Competitive rank letter. `Z` means unranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Rank {
    #[serde(rename = "x+")]
    XPlus,
    #[serde(rename = "x")]
    X,
    #[serde(rename = "u")]
    U,
    #[serde(rename = "ss")]
    SS,
    #[serde(rename = "s+")]
    SPlus,
    #[serde(rename = "s")]
    S,
    #[serde(rename = "s-")]
    SMinus,
    #[serde(rename = "a+")]
    APlus,
    #[serde(rename = "a")]
    A,
    #[serde(rename = "a-")]
    AMinus,
    #[serde(rename = "b+")]
    BPlus,
    #[serde(rename = "b")]
    B,
    #[serde(rename = "b-")]
    BMinus,
    #[serde(rename = "c+")]
    CPlus,
    #[serde(rename = "c")]
    C,
    #[serde(rename = "c-")]
    CMinus,
    #[serde(rename = "d+")]
    DPlus,
    #[serde(rename = "d")]
    D,
    #[serde(rename = "z")]
    Z,
}

impl Rank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::XPlus => "x+",
            Rank::X => "x",
            Rank::U => "u",
            Rank::SS => "ss",
            Rank::SPlus => "s+",
            Rank::S => "s",
            Rank::SMinus => "s-",
            Rank::APlus => "a+",
            Rank::A => "a",
            Rank::AMinus => "a-",
            Rank::BPlus => "b+",
            Rank::B => "b",
            Rank::BMinus => "b-",
            Rank::CPlus => "c+",
            Rank::C => "c",
            Rank::CMinus => "c-",
            Rank::DPlus => "d+",
            Rank::D => "d",
            Rank::Z => "z",
        }
    }

    pub fn is_ranked(&self) -> bool {
        *self != Rank::Z
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical identity of a player. Two users are equal when their IDs are.
#[derive(Debug, Clone, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// `users/{user}` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub avatar_revision: Option<u64>,
    #[serde(default)]
    pub banner_revision: Option<u64>,
}

/// Which summary endpoint to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryKind {
    /// 40 lines.
    Sprint,
    Blitz,
    League,
}

impl SummaryKind {
    pub fn as_path(&self) -> &'static str {
        match self {
            SummaryKind::Sprint => "40l",
            SummaryKind::Blitz => "blitz",
            SummaryKind::League => "league",
        }
    }
}

/// User as embedded in a solo record.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub avatar_revision: Option<u64>,
    #[serde(default)]
    pub banner_revision: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordStats {
    /// Completion time in milliseconds.
    #[serde(default)]
    pub finaltime: Option<f64>,
    #[serde(default)]
    pub score: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordResults {
    pub stats: RecordStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SoloRecord {
    pub user: RecordUser,
    pub results: RecordResults,
}

/// `summaries/40l` and `summaries/blitz` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SoloSummary {
    pub record: Option<SoloRecord>,
    /// Global rank, -1 when not ranked.
    pub rank: i64,
    pub rank_local: i64,
}

/// `summaries/league` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LeagueSummary {
    #[serde(default)]
    pub gamesplayed: u32,
    #[serde(default)]
    pub gameswon: u32,
    /// Tetra Rating, -1 when unrated.
    pub tr: f64,
    pub rank: Rank,
    #[serde(default)]
    pub gxe: Option<f64>,
}
