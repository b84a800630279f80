//! # funnelbot
//!
//! Scripted conversation funnels for chat bots.
//!
//! A declarative [`Script`] maps event identifiers to content (text, photo,
//! document, audio, video), buttons and subscription gates. The [`Funnel`]
//! turns inbound updates into rendered events and sends them through a
//! [`Transport`] you provide.
//!
//! ## Quick Start
//!
//! ```ignore
//! use funnelbot::prelude::*;
//!
//! let script = Script::from_json(r#"{
//!     "/start": {"message": {"text": "Hello!", "buttons": [{"text": "Next", "nextID": "step2"}]}},
//!     "step2": {"message": {"text": "Second step", "image": "step2.jpg"}}
//! }"#)?;
//!
//! let funnel = Funnel::builder()
//!     .options(FunnelOptions::new(token).files_root("./media").cache_path("./media/cache.json"))
//!     .script(script)
//!     .transport(transport.clone())
//!     .bind()?;
//!
//! // from the transport's receive loop
//! funnel.handle_update(&update)?;
//! ```
//!
//! ## Crates
//!
//! - [`funnelbot_core`]: data model, error taxonomy, collaborator traits
//! - [`funnelbot_wire`]: entry-command payload codec
//! - [`funnelbot_cache`]: persistent media handle cache
//! - [`funnelbot_engine`]: dispatcher, renderer, subscription gate

#![warn(missing_docs)]

pub mod prelude;

pub use funnelbot_cache;
pub use funnelbot_core;
pub use funnelbot_engine;
pub use funnelbot_wire;

pub use funnelbot_cache::MediaCache;
pub use funnelbot_core::{
    Body, ButtonSpec, ChannelId, EventDefinition, Error, OutboundMessage, Result, Script, Sender,
    SentMessage, Transport, Update, UserId, UserPayload,
};
pub use funnelbot_engine::{
    Funnel, FunnelBuilder, FunnelOptions, UserInputFeature, UPLOAD_FAILED_TEXT,
};
pub use funnelbot_wire::{decode_payload, encode_payload};
