//! Identifier types
//!
//! - [`UserId`]: the chat platform's identifier for a user (also the chat to reply to)
//! - [`ChannelId`]: identifier of a channel used for subscription gating

use serde::{Deserialize, Serialize};

/// Platform identifier of a user
///
/// Private conversations use the user identifier as the recipient, so the
/// same value addresses replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// Raw numeric value
    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Platform identifier of a gating channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub i64);

impl From<i64> for ChannelId {
    fn from(id: i64) -> Self {
        ChannelId(id)
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
