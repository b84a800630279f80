//! Funnel engine
//!
//! Binds a [`Script`](funnelbot_core::Script) to a chat transport and runs the
//! conversation:
//! - [`Funnel`]: trigger dispatch, entry-command handling, delivery
//! - [`QueryHandler`]: renders one event into an outbound message
//! - [`SubscriptionGate`]: channel membership check in front of locked events
//! - [`FunnelOptions`] and [`UserInputFeature`]: configuration
//!
//! # Example
//!
//! ```ignore
//! use funnelbot_engine::{Funnel, FunnelOptions};
//!
//! let funnel = Funnel::builder()
//!     .options(FunnelOptions::load("funnel.toml")?)
//!     .script(Script::from_json(&std::fs::read_to_string("script.json")?)?)
//!     .transport(transport)
//!     .bind()?;
//!
//! for update in transport.updates() {
//!     funnel.handle_update(&update)?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod features;
pub mod funnel;
pub mod gate;
pub mod layout;
pub mod options;
pub mod query;
pub mod sanitize;
pub mod triggers;
pub mod validate;

#[cfg(test)]
mod testing;

pub use features::UserInputFeature;
pub use funnel::{Funnel, FunnelBuilder};
pub use gate::{GateError, SubscriptionGate};
pub use layout::{add_utm_tags, layout_buttons};
pub use options::{FunnelOptions, DEFAULT_ENTRY_EVENT};
pub use query::{QueryHandler, Rendered, UPLOAD_FAILED_TEXT};
pub use triggers::TriggerTable;
