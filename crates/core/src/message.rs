//! Outbound message types
//!
//! The engine renders an event into an [`OutboundMessage`]; the transport turns
//! it into a platform request and reports back a [`SentMessage`].

use crate::script::{MediaKind, ParseFormat};
use crate::types::UserId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Media handle issued by the chat platform after an upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Identifier usable to resend the file
    pub file_id: String,
    /// Stable identifier of the file content
    pub unique_id: String,
    /// Size in bytes
    pub size: u64,
}

/// How a media attachment is sourced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaRef {
    /// Previously uploaded file
    Remote(RemoteFile),
    /// Upload from the local file system
    Disk(PathBuf),
    /// Let the platform fetch the URL
    Url(String),
}

impl MediaRef {
    /// True when the transport has to upload bytes
    pub fn is_upload(&self) -> bool {
        matches!(self, MediaRef::Disk(_))
    }
}

/// Message content
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Plain text
    Text(String),
    /// Photo with optional caption
    Photo {
        /// Image source
        file: MediaRef,
        /// Caption
        caption: Option<String>,
    },
    /// Document
    Document {
        /// Document source
        file: MediaRef,
        /// File name shown to the user
        file_name: Option<String>,
        /// Caption
        caption: Option<String>,
        /// Preview image
        thumbnail: Option<MediaRef>,
    },
    /// Audio
    Audio {
        /// Audio source
        file: MediaRef,
        /// File name shown to the user
        file_name: Option<String>,
        /// Duration in seconds
        duration: Option<u32>,
        /// Caption
        caption: Option<String>,
    },
    /// Video
    Video {
        /// Video source
        file: MediaRef,
        /// File name shown to the user
        file_name: String,
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
        /// Caption
        caption: Option<String>,
        /// Preview image
        thumbnail: Option<MediaRef>,
    },
}

impl Body {
    /// Kind of this body
    pub fn kind(&self) -> MediaKind {
        match self {
            Body::Text(_) => MediaKind::Text,
            Body::Photo { .. } => MediaKind::Photo,
            Body::Document { .. } => MediaKind::Document,
            Body::Audio { .. } => MediaKind::Audio,
            Body::Video { .. } => MediaKind::Video,
        }
    }

    /// Text of a text body, or caption of a media body
    pub fn text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            Body::Photo { caption, .. }
            | Body::Document { caption, .. }
            | Body::Audio { caption, .. }
            | Body::Video { caption, .. } => caption.as_deref(),
        }
    }

    /// Main media source, `None` for text
    pub fn media(&self) -> Option<&MediaRef> {
        match self {
            Body::Text(_) => None,
            Body::Photo { file, .. }
            | Body::Document { file, .. }
            | Body::Audio { file, .. }
            | Body::Video { file, .. } => Some(file),
        }
    }
}

/// Inline keyboard button
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineButton {
    /// Callback button carrying the destination event identifier
    Next {
        /// Label
        label: String,
        /// Destination event identifier (callback data)
        event_id: String,
    },
    /// Link button
    Url {
        /// Label
        label: String,
        /// Target URL
        url: String,
    },
}

impl InlineButton {
    /// Button label
    pub fn label(&self) -> &str {
        match self {
            InlineButton::Next { label, .. } | InlineButton::Url { label, .. } => label,
        }
    }
}

/// Rows of inline buttons
pub type Keyboard = Vec<Vec<InlineButton>>;

/// Fully rendered message ready for the transport
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    /// Content
    pub body: Body,
    /// Text format
    pub format: ParseFormat,
    /// Suppress link previews
    pub disable_preview: bool,
    /// Inline keyboard, empty for none
    pub keyboard: Keyboard,
}

/// Result of a successful send
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentMessage {
    /// Platform message identifier
    pub message_id: i64,
    /// Chat the message was sent to
    pub chat: UserId,
    /// Handle of the uploaded or reused main media, when there is one
    pub media: Option<RemoteFile>,
}

/// Activity indicator shown while a message is prepared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatAction {
    /// Typing text
    Typing,
    /// Uploading a photo
    UploadingPhoto,
    /// Uploading a document
    UploadingDocument,
    /// Uploading a video
    UploadingVideo,
    /// Uploading audio
    UploadingAudio,
}

impl From<MediaKind> for ChatAction {
    fn from(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Text => ChatAction::Typing,
            MediaKind::Photo => ChatAction::UploadingPhoto,
            MediaKind::Document => ChatAction::UploadingDocument,
            MediaKind::Video => ChatAction::UploadingVideo,
            MediaKind::Audio => ChatAction::UploadingAudio,
        }
    }
}
