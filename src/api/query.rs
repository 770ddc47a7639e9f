//! User identifiers as typed by people.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const ID_LEN: usize = 24;
const NAME_LEN: std::ops::RangeInclusive<usize> = 3..=16;

/// Input that is neither a user ID nor a user name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a valid user name or ID")]
pub struct InvalidUser(pub String);

/// A user, referenced by ID or by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserQuery {
    /// 24 lowercase hex characters.
    Id(String),
    /// 3 to 16 characters of `[A-Za-z0-9_-]`.
    Name(String),
}

impl UserQuery {
    /// Path segment used in API requests. Names are case-insensitive upstream.
    pub fn request_param(&self) -> String {
        match self {
            UserQuery::Id(id) => id.clone(),
            UserQuery::Name(name) => name.to_lowercase(),
        }
    }
}

impl FromStr for UserQuery {
    type Err = InvalidUser;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if is_user_id(s) {
            Ok(UserQuery::Id(s.to_string()))
        } else if is_user_name(s) {
            Ok(UserQuery::Name(s.to_string()))
        } else {
            Err(InvalidUser(s.to_string()))
        }
    }
}

impl fmt::Display for UserQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserQuery::Id(s) | UserQuery::Name(s) => f.write_str(s),
        }
    }
}

fn is_user_id(s: &str) -> bool {
    s.len() == ID_LEN && s.bytes().all(|b| matches!(b, b'a'..=b'f' | b'0'..=b'9'))
}

fn is_user_name(s: &str) -> bool {
    NAME_LEN.contains(&s.len()) && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}
