//! Conversation script model
//!
//! A [`Script`] maps event identifiers to [`EventDefinition`]s. Scripts are
//! usually loaded from JSON:
//!
//! ```
//! use funnelbot_core::Script;
//!
//! let script = Script::from_json(r#"{
//!     "/start": {"message": {"text": "Hello", "buttons": [{"text": "next", "nextID": "step2"}]}},
//!     "step2": {"message": {"text": "Second step"}}
//! }"#).unwrap();
//! assert_eq!(script.len(), 2);
//! ```
//!
//! Callbacks ([`RenderOverride`], [`EventHook`]) are attached in code after
//! loading and are never serialized.

use crate::error::{Error, Result};
use crate::message::Body;
use crate::types::{ChannelId, UserId};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Image path that selects a URL built from the user's stored input
pub const PARAMETRIC_IMAGE: &str = "parametric";

/// Parametric image argument taken from the user's stored input
pub const USER_INPUT_ARGUMENT: &str = "userInput";

/// Message text format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParseFormat {
    /// Markdown markup
    #[default]
    #[serde(alias = "markdown")]
    Markdown,
    /// HTML markup
    #[serde(rename = "HTML", alias = "html")]
    Html,
}

/// Strategy that replaces built-in content rendering for one event
#[derive(Clone)]
pub struct RenderOverride(Arc<dyn Fn(UserId) -> Body + Send + Sync>);

impl RenderOverride {
    /// Wrap a rendering function
    pub fn new(f: impl Fn(UserId) -> Body + Send + Sync + 'static) -> Self {
        RenderOverride(Arc::new(f))
    }

    /// Render the body for `user`
    pub fn render(&self, user: UserId) -> Body {
        (self.0)(user)
    }
}

impl std::fmt::Debug for RenderOverride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RenderOverride(..)")
    }
}

/// Per-event hook run before the event is delivered
///
/// Receives the acting user and the requested event identifier. An error
/// aborts delivery of the event.
#[derive(Clone)]
pub struct EventHook(Arc<dyn Fn(UserId, &str) -> Result<()> + Send + Sync>);

impl EventHook {
    /// Wrap a hook function
    pub fn new(f: impl Fn(UserId, &str) -> Result<()> + Send + Sync + 'static) -> Self {
        EventHook(Arc::new(f))
    }

    /// Run the hook
    pub fn call(&self, user: UserId, event_id: &str) -> Result<()> {
        (self.0)(user, event_id)
    }
}

impl std::fmt::Debug for EventHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EventHook(..)")
    }
}

/// One addressable unit of conversation content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventDefinition {
    /// What to send
    pub message: EventMessage,
    /// Subscription gate in front of the message
    #[serde(rename = "locker")]
    pub locker: Locker,
}

impl EventDefinition {
    /// Plain text event
    pub fn text(text: impl Into<String>) -> Self {
        EventDefinition {
            message: EventMessage {
                text: text.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Builder: append a button
    pub fn with_button(mut self, button: ButtonSpec) -> Self {
        self.message.buttons.push(button);
        self
    }

    /// Builder: gate the event behind `channel`, showing `fallback_event` on failure
    pub fn with_locker(mut self, channel: ChannelId, fallback_event: impl Into<String>) -> Self {
        self.locker = Locker {
            enabled: true,
            channel,
            fallback_event: fallback_event.into(),
        };
        self
    }
}

/// Message part of an event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventMessage {
    /// Text, or caption for media variants
    pub text: String,

    /// Replaces content rendering entirely
    #[serde(skip)]
    pub render: Option<RenderOverride>,

    /// Runs before delivery
    #[serde(skip)]
    pub on_event: Option<EventHook>,

    /// Local file name, URL, or [`PARAMETRIC_IMAGE`]
    pub image: String,
    /// Parametric image descriptor
    pub image_data: ImageData,
    /// Document attachment
    pub file: FileData,
    /// Audio attachment
    pub audio: AudioData,
    /// Video attachment
    pub video: VideoData,

    /// Inline buttons in declared order
    #[serde(deserialize_with = "null_as_default")]
    pub buttons: Vec<ButtonSpec>,
    /// One button per row
    pub buttons_is_columns: bool,
    /// Buttons per row; 0 keeps every button on one row
    pub buttons_split: usize,

    /// Text format; the funnel default applies when unset
    #[serde(deserialize_with = "format_or_unset")]
    pub format: Option<ParseFormat>,

    /// Single conversion tag (wins over `conversions`)
    pub conversion: String,
    /// Conversion tags reported in order
    #[serde(deserialize_with = "null_as_default")]
    pub conversions: Vec<String>,

    /// Pin the message after sending
    #[serde(rename = "pin")]
    pub pin_this_message: bool,
    /// Suppress link previews
    pub disable_preview: bool,
}

/// `null` reads as the empty value
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `null` and `""` leave the format unset
fn format_or_unset<'de, D>(deserializer: D) -> std::result::Result<Option<ParseFormat>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref() {
        None | Some("") => Ok(None),
        Some("Markdown" | "markdown") => Ok(Some(ParseFormat::Markdown)),
        Some("HTML" | "html") => Ok(Some(ParseFormat::Html)),
        Some(other) => Err(serde::de::Error::unknown_variant(other, &["Markdown", "HTML"])),
    }
}

impl EventMessage {
    /// Content variant by fixed precedence: image > document > video > audio > text
    pub fn content(&self) -> Content<'_> {
        if !self.image.is_empty() {
            return Content::Photo(&self.image);
        }
        if !self.file.path.is_empty() {
            return Content::Document(&self.file);
        }
        if !self.video.path.is_empty() {
            return Content::Video(&self.video);
        }
        if !self.audio.path.is_empty() {
            return Content::Audio(&self.audio);
        }
        Content::Text(&self.text)
    }

    /// Conversion tags to report for this message
    pub fn conversion_tags(&self) -> Vec<&str> {
        if !self.conversion.is_empty() {
            return vec![self.conversion.as_str()];
        }
        self.conversions
            .iter()
            .map(String::as_str)
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

/// Content variant selected from an [`EventMessage`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Content<'a> {
    /// Image path or URL
    Photo(&'a str),
    /// Document with optional preview
    Document(&'a FileData),
    /// Video with optional preview
    Video(&'a VideoData),
    /// Audio with optional duration
    Audio(&'a AudioData),
    /// Plain text
    Text(&'a str),
}

impl Content<'_> {
    /// Kind of this variant
    pub fn kind(&self) -> MediaKind {
        match self {
            Content::Photo(_) => MediaKind::Photo,
            Content::Document(_) => MediaKind::Document,
            Content::Video(_) => MediaKind::Video,
            Content::Audio(_) => MediaKind::Audio,
            Content::Text(_) => MediaKind::Text,
        }
    }
}

/// Message kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Plain text
    Text,
    /// Photo
    Photo,
    /// Document
    Document,
    /// Video
    Video,
    /// Audio
    Audio,
}

/// Parametric image descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageData {
    /// URL template; `%s` (or `{}`) is replaced with the argument
    pub url_format: String,
    /// Where the argument comes from; only [`USER_INPUT_ARGUMENT`] is known
    pub argument_type: String,
}

impl ImageData {
    /// URL with the first placeholder replaced by `argument`
    ///
    /// `None` when the template has no placeholder.
    pub fn url_for(&self, argument: &str) -> Option<String> {
        ["%s", "{}"]
            .into_iter()
            .find(|placeholder| self.url_format.contains(placeholder))
            .map(|placeholder| self.url_format.replacen(placeholder, argument, 1))
    }
}

/// Document attachment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileData {
    /// Local path (relative to the files root) or URL
    pub path: String,
    /// File name shown to the user
    pub name: String,
    /// Preview image path
    #[serde(rename = "preview")]
    pub preview_image_path: String,
}

/// Audio attachment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioData {
    /// Local path (relative to the files root) or URL
    pub path: String,
    /// File name shown to the user
    pub name: String,
    /// Duration in seconds; 0 when unknown
    pub duration: u32,
}

/// Video attachment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoData {
    /// Local path (relative to the files root) or URL
    pub path: String,
    /// Preview image path
    #[serde(rename = "preview")]
    pub preview_image_path: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Declared button
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ButtonSpec {
    /// Label
    pub text: String,
    /// Destination event identifier
    #[serde(rename = "nextID")]
    pub next_event: String,
    /// External URL
    pub url: String,
    /// Append attribution query parameters to `url`
    pub use_utm_tags: bool,
}

/// Resolved button action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonTarget<'a> {
    /// Move to another event
    Next(&'a str),
    /// Open a link
    Url(&'a str),
}

impl ButtonSpec {
    /// Button leading to another event
    pub fn next(text: impl Into<String>, next_event: impl Into<String>) -> Self {
        ButtonSpec {
            text: text.into(),
            next_event: next_event.into(),
            ..Default::default()
        }
    }

    /// Button opening a link
    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        ButtonSpec {
            text: text.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    /// Builder: request attribution tags on the link
    pub fn with_utm_tags(mut self) -> Self {
        self.use_utm_tags = true;
        self
    }

    /// The action, or `None` unless exactly one of destination / URL is set
    pub fn target(&self) -> Option<ButtonTarget<'_>> {
        match (self.next_event.is_empty(), self.url.is_empty()) {
            (false, true) => Some(ButtonTarget::Next(&self.next_event)),
            (true, false) => Some(ButtonTarget::Url(&self.url)),
            _ => None,
        }
    }
}

/// Subscription gate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Locker {
    /// Gate is active
    pub enabled: bool,
    /// Channel the user must belong to
    #[serde(rename = "chatID")]
    pub channel: ChannelId,
    /// Event shown when the check fails
    #[serde(rename = "lockerMessageID")]
    pub fallback_event: String,
}

/// Event identifier → definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    events: HashMap<String, EventDefinition>,
}

impl Script {
    /// Empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a script from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Validation(format!("parse script: {}", e)))
    }

    /// Builder: add an event
    pub fn with_event(mut self, id: impl Into<String>, event: EventDefinition) -> Self {
        self.insert(id, event);
        self
    }

    /// Add or replace an event
    pub fn insert(&mut self, id: impl Into<String>, event: EventDefinition) -> Option<EventDefinition> {
        self.events.insert(id.into(), event)
    }

    /// Look up an event
    pub fn get(&self, id: &str) -> Option<&EventDefinition> {
        self.events.get(id)
    }

    /// Look up an event together with its stored identifier
    pub fn get_key_value(&self, id: &str) -> Option<(&str, &EventDefinition)> {
        self.events
            .get_key_value(id)
            .map(|(id, event)| (id.as_str(), event))
    }

    /// Mutable access to an event, for attaching callbacks after loading
    pub fn get_mut(&mut self, id: &str) -> Option<&mut EventDefinition> {
        self.events.get_mut(id)
    }

    /// Check if an event exists
    pub fn contains(&self, id: &str) -> bool {
        self.events.contains_key(id)
    }

    /// Iterate over (identifier, definition)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EventDefinition)> {
        self.events.iter().map(|(id, event)| (id.as_str(), event))
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the script has no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Normalize whitespace in every message text
    pub fn normalize_text(&mut self) {
        for event in self.events.values_mut() {
            event.message.text = normalize_whitespace(&event.message.text);
        }
    }
}

impl FromIterator<(String, EventDefinition)> for Script {
    fn from_iter<I: IntoIterator<Item = (String, EventDefinition)>>(iter: I) -> Self {
        Script {
            events: iter.into_iter().collect(),
        }
    }
}

/// Trim spaces around each paragraph and drop tab characters
///
/// Paragraphs are separated by a blank line (`"\n\n"`); the separators are kept.
pub fn normalize_whitespace(text: &str) -> String {
    text.split("\n\n")
        .map(|paragraph| paragraph.trim_matches(' ').replace('\t', ""))
        .collect::<Vec<_>>()
        .join("\n\n")
}
