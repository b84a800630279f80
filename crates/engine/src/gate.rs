//! Subscription gate
//!
//! A locked event is shown only to members of the gating channel. The gate
//! answers a single question per user and never recurses: the caller renders
//! the locker's fallback event when the check does not pass.

use funnelbot_core::{ChannelId, Error, MemberRole, MembershipLookup, UserId};
use thiserror::Error as ThisError;

/// Subscription check failure
#[derive(Debug, ThisError)]
pub enum GateError {
    /// User is restricted or kicked from the channel
    #[error("user is banned from the channel (role: {role})")]
    Banned {
        /// Role reported by the lookup
        role: String,
    },

    /// Lookup reported a role the gate does not know
    #[error("unknown member role {0:?}")]
    UnknownRole(String),

    /// Membership lookup failed
    #[error("membership lookup: {0}")]
    Lookup(Error),
}

impl From<GateError> for Error {
    fn from(e: GateError) -> Self {
        match e {
            GateError::Lookup(inner) => inner,
            other => Error::external("membership check", other),
        }
    }
}

/// Membership check against one channel
pub struct SubscriptionGate<'a, L: MembershipLookup + ?Sized> {
    lookup: &'a L,
    channel: ChannelId,
}

impl<'a, L: MembershipLookup + ?Sized> SubscriptionGate<'a, L> {
    /// Gate on `channel` backed by `lookup`
    pub fn new(lookup: &'a L, channel: ChannelId) -> Self {
        SubscriptionGate { lookup, channel }
    }

    /// Gating channel
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    /// `Ok(true)` when `user` may see the gated content, `Ok(false)` when not a member
    pub fn check(&self, user: UserId) -> Result<bool, GateError> {
        let role = self
            .lookup
            .member_role(self.channel, user)
            .map_err(GateError::Lookup)?;

        match role {
            MemberRole::Creator | MemberRole::Administrator | MemberRole::Member => Ok(true),
            MemberRole::Left => Ok(false),
            MemberRole::Restricted | MemberRole::Kicked => Err(GateError::Banned {
                role: role.as_str().to_string(),
            }),
            MemberRole::Other(role) => Err(GateError::UnknownRole(role)),
        }
    }
}
