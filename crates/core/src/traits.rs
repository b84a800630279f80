//! Collaborator traits
//!
//! The engine never talks to the network or a database directly. Everything
//! external goes through one of these traits:
//!
//! - [`Transport`]: the chat platform (send, notify, pin, membership lookup)
//! - [`UserStore`]: user profile persistence
//! - [`ConversionSink`]: conversion reporting
//! - [`AttributionSource`]: per-user attribution tags for outbound links
//! - [`CommandSink`]: handler for slash commands that are not script events
//!
//! All traits are object safe and require `Send + Sync`, so a single funnel
//! can serve updates from many threads.

use crate::error::Result;
use crate::message::{ChatAction, OutboundMessage, SentMessage};
use crate::payload::UserPayload;
use crate::types::{ChannelId, UserId};
use crate::update::{Sender, Trigger};

/// Role of a user in a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberRole {
    /// Channel owner
    Creator,
    /// Administrator
    Administrator,
    /// Regular member
    Member,
    /// Member with restrictions
    Restricted,
    /// Not a member (never joined or left)
    Left,
    /// Banned
    Kicked,
    /// Role string the engine does not recognize
    Other(String),
}

impl MemberRole {
    /// Parse the platform's role string
    pub fn parse(role: &str) -> Self {
        match role {
            "creator" => MemberRole::Creator,
            "administrator" => MemberRole::Administrator,
            "member" => MemberRole::Member,
            "restricted" => MemberRole::Restricted,
            "left" => MemberRole::Left,
            "kicked" => MemberRole::Kicked,
            other => MemberRole::Other(other.to_string()),
        }
    }

    /// Platform role string
    pub fn as_str(&self) -> &str {
        match self {
            MemberRole::Creator => "creator",
            MemberRole::Administrator => "administrator",
            MemberRole::Member => "member",
            MemberRole::Restricted => "restricted",
            MemberRole::Left => "left",
            MemberRole::Kicked => "kicked",
            MemberRole::Other(role) => role,
        }
    }
}

/// Channel membership lookup
pub trait MembershipLookup: Send + Sync {
    /// Role of `user` in `channel`
    fn member_role(&self, channel: ChannelId, user: UserId) -> Result<MemberRole>;
}

/// Chat platform transport
///
/// Implementations wrap a platform client. The transport's receive loop feeds
/// updates to the funnel; the funnel calls back into the transport to reply.
pub trait Transport: MembershipLookup {
    /// Announce a trigger pattern the funnel handles
    fn register(&self, _trigger: &Trigger) -> Result<()> {
        Ok(())
    }

    /// Send a message to `recipient`
    fn send(&self, recipient: UserId, message: &OutboundMessage) -> Result<SentMessage>;

    /// Show an activity indicator to `recipient`
    fn notify(&self, recipient: UserId, action: ChatAction) -> Result<()>;

    /// Pin a sent message
    fn pin(&self, message: &SentMessage) -> Result<()>;

    /// Acknowledge a button press
    fn answer_callback(&self, _callback_id: &str) -> Result<()> {
        Ok(())
    }
}

/// Stored user profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    /// Store-assigned identifier, `None` before the first save
    pub id: Option<i64>,
    /// Platform user identifier
    pub external_id: UserId,
    /// Display name
    pub name: String,
    /// `@username`
    pub handle: String,
}

impl UserProfile {
    /// Profile for a new sender
    pub fn from_sender(sender: &Sender) -> Self {
        UserProfile {
            id: None,
            external_id: sender.id,
            name: sender.display_name(),
            handle: format!("@{}", sender.username),
        }
    }
}

/// User profile persistence
pub trait UserStore: Send + Sync {
    /// Find a profile by platform identifier
    fn find_by_external_id(&self, id: UserId) -> Result<Option<UserProfile>>;

    /// Save a new profile, returning the assigned identifier
    fn save(&self, profile: &UserProfile) -> Result<i64>;

    /// Platform identifiers of every stored user
    fn list_external_ids(&self) -> Result<Vec<UserId>>;
}

/// Conversion reporting
pub trait ConversionSink: Send + Sync {
    /// Report that `user` reached a conversion `tag`
    fn report_conversion(&self, user: UserId, tag: &str, payload: &UserPayload) -> Result<()>;
}

impl<F> ConversionSink for F
where
    F: Fn(UserId, &str, &UserPayload) -> Result<()> + Send + Sync,
{
    fn report_conversion(&self, user: UserId, tag: &str, payload: &UserPayload) -> Result<()> {
        self(user, tag, payload)
    }
}

/// Attribution tags appended to outbound links
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributionTags {
    /// utm_source
    pub source: String,
    /// utm_campaign
    pub campaign: String,
    /// utm_content
    pub content: String,
}

/// Per-user attribution tag lookup
pub trait AttributionSource: Send + Sync {
    /// Tags recorded for `user`
    fn attribution_tags(&self, user: UserId) -> AttributionTags;
}

impl<F> AttributionSource for F
where
    F: Fn(UserId) -> AttributionTags + Send + Sync,
{
    fn attribution_tags(&self, user: UserId) -> AttributionTags {
        self(user)
    }
}

/// Handler for slash commands that are not script events
pub trait CommandSink: Send + Sync {
    /// Handle `command` (first token, slash included) with the remaining text
    fn handle_command(&self, sender: &Sender, command: &str, argument: &str) -> Result<()>;
}

impl<F> CommandSink for F
where
    F: Fn(&Sender, &str, &str) -> Result<()> + Send + Sync,
{
    fn handle_command(&self, sender: &Sender, command: &str, argument: &str) -> Result<()> {
        self(sender, command, argument)
    }
}

/// Handler for data posted by a web app
pub trait WebAppSink: Send + Sync {
    /// Handle the raw `data` posted by `sender`'s web app
    fn handle_web_app(&self, sender: &Sender, data: &str) -> Result<()>;
}

impl<F> WebAppSink for F
where
    F: Fn(&Sender, &str) -> Result<()> + Send + Sync,
{
    fn handle_web_app(&self, sender: &Sender, data: &str) -> Result<()> {
        self(sender, data)
    }
}
