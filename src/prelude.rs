//! Convenient imports for funnelbot.
//!
//! ```ignore
//! use funnelbot::prelude::*;
//! ```

// Entry point
pub use funnelbot_engine::{Funnel, FunnelBuilder, FunnelOptions, UserInputFeature};

// Error handling
pub use funnelbot_core::{Error, Result};

// Script model
pub use funnelbot_core::{
    ButtonSpec, ChannelId, EventDefinition, EventHook, ParseFormat, RenderOverride, Script,
};

// Collaborators
pub use funnelbot_core::{
    AttributionSource, AttributionTags, ChatAction, CommandSink, ConversionSink, MemberRole,
    MembershipLookup, OutboundMessage, SentMessage, Transport, Trigger, UserProfile, UserStore,
    WebAppSink,
};

// Updates
pub use funnelbot_core::{Sender, Update, UserId, UserPayload};
