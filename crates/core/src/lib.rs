//! Core types for funnelbot
//!
//! This crate defines the shared vocabulary of the funnel engine:
//! - [`Script`] and [`EventDefinition`]: the declarative conversation script
//! - [`UserPayload`]: attribution data carried on the entry command
//! - [`OutboundMessage`] and [`Body`]: what the engine asks the transport to send
//! - [`Update`]: what the transport delivers to the engine
//! - Collaborator traits ([`Transport`], [`UserStore`], [`ConversionSink`], ...)
//! - [`Error`]: the error taxonomy shared by every crate in the workspace

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod message;
pub mod payload;
pub mod script;
pub mod traits;
pub mod types;
pub mod update;

pub use error::{Error, Result};
pub use message::{
    Body, ChatAction, InlineButton, Keyboard, MediaRef, OutboundMessage, RemoteFile, SentMessage,
};
pub use payload::UserPayload;
pub use script::{
    AudioData, ButtonSpec, ButtonTarget, Content, EventDefinition, EventHook, EventMessage,
    FileData, ImageData, Locker, MediaKind, ParseFormat, RenderOverride, Script, VideoData,
    PARAMETRIC_IMAGE, USER_INPUT_ARGUMENT,
};
pub use traits::{
    AttributionSource, AttributionTags, CommandSink, ConversionSink, MemberRole, MembershipLookup,
    Transport, UserProfile, UserStore, WebAppSink,
};
pub use types::{ChannelId, UserId};
pub use update::{Sender, Trigger, Update};
