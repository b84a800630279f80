//! Event rendering
//!
//! A [`QueryHandler`] turns one script event into an [`OutboundMessage`] for one
//! user: conversions are reported, the content variant is selected, local media
//! is resolved through the cache, and buttons are laid out.
//!
//! Missing local files never fail rendering. The message degrades instead:
//!
//! | Variant | Missing file |
//! |---------|--------------|
//! | photo | caption as plain text |
//! | document, video | [`UPLOAD_FAILED_TEXT`] |
//! | audio | caption as plain text |

use crate::features::Features;
use crate::layout::{add_utm_tags, layout_buttons};
use funnelbot_cache::{is_remote_url, MediaCache};
use funnelbot_core::{
    AudioData, Body, ButtonSpec, ButtonTarget, ChatAction, Content, EventDefinition, FileData,
    InlineButton, Keyboard, MediaKind, MediaRef, OutboundMessage, ParseFormat, Transport, UserId,
    UserPayload, VideoData, PARAMETRIC_IMAGE, USER_INPUT_ARGUMENT,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reply used when a document or video file is missing
pub const UPLOAD_FAILED_TEXT: &str = "Failed to upload file for delivery. Try again later, sorry";

/// Collaborators shared by every handler of one funnel
pub(crate) struct RenderContext {
    pub transport: Arc<dyn Transport>,
    pub cache: MediaCache,
    pub features: Features,
    pub default_format: ParseFormat,
}

/// Rendered event
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    /// Message to send
    pub message: OutboundMessage,
    /// Local path whose remote handle should be cached after a successful send
    pub attachment: Option<String>,
}

/// Renders one script event
pub struct QueryHandler<'a> {
    ctx: &'a RenderContext,
    event_id: &'a str,
    event: &'a EventDefinition,
}

impl<'a> QueryHandler<'a> {
    pub(crate) fn new(ctx: &'a RenderContext, event_id: &'a str, event: &'a EventDefinition) -> Self {
        QueryHandler {
            ctx,
            event_id,
            event,
        }
    }

    /// Identifier of the rendered event
    pub fn event_id(&self) -> &'a str {
        self.event_id
    }

    /// Definition of the rendered event
    pub fn event(&self) -> &'a EventDefinition {
        self.event
    }

    /// Render the event for `user`
    ///
    /// An override callback replaces conversions and content selection; buttons
    /// and message options still apply.
    pub fn build(&self, user: UserId, payload: &UserPayload) -> Rendered {
        let message = &self.event.message;

        let (body, attachment) = match &message.render {
            Some(render) => (render.render(user), None),
            None => {
                self.report_conversions(user, payload);
                self.build_body(user)
            }
        };

        Rendered {
            message: OutboundMessage {
                body,
                format: message.format.unwrap_or(self.ctx.default_format),
                disable_preview: message.disable_preview,
                keyboard: self.build_keyboard(user),
            },
            attachment,
        }
    }

    fn report_conversions(&self, user: UserId, payload: &UserPayload) {
        let Some(sink) = &self.ctx.features.conversions else {
            return;
        };
        for tag in self.event.message.conversion_tags() {
            if let Err(e) = sink.report_conversion(user, tag, payload) {
                warn!("Conversion {:?} for user {} failed: {}", tag, user, e);
            }
        }
    }

    fn build_body(&self, user: UserId) -> (Body, Option<String>) {
        let content = self.event.message.content();
        if content.kind() != MediaKind::Text {
            self.notify(user, ChatAction::from(content.kind()));
        }

        match content {
            Content::Text(text) => (Body::Text(text.to_string()), None),
            Content::Photo(path) if path == PARAMETRIC_IMAGE => (self.parametric_photo(user), None),
            Content::Photo(path) => self.photo(path),
            Content::Document(file) => self.document(file),
            Content::Video(video) => self.video(video),
            Content::Audio(audio) => self.audio(audio),
        }
    }

    fn notify(&self, user: UserId, action: ChatAction) {
        if let Err(e) = self.ctx.transport.notify(user, action) {
            warn!("Notify {:?} to user {} failed: {}", action, user, e);
        }
    }

    fn caption(&self) -> Option<String> {
        non_empty(&self.event.message.text)
    }

    fn plain_text(&self) -> Body {
        Body::Text(self.event.message.text.clone())
    }

    /// Source of `path`, `None` for a local file that does not exist
    ///
    /// The second value is the local path to cache after sending.
    fn resolve(&self, path: &str) -> Option<(MediaRef, Option<String>)> {
        if is_remote_url(path) {
            return Some((MediaRef::Url(path.to_string()), None));
        }
        if !self.ctx.cache.exists(path) {
            warn!(
                "Event {}: file {} does not exist",
                self.event_id,
                self.ctx.cache.resolve(path).display()
            );
            return None;
        }
        Some((self.ctx.cache.source(path), Some(path.to_string())))
    }

    fn thumbnail(&self, path: &str) -> Option<MediaRef> {
        if path.is_empty() {
            return None;
        }
        if is_remote_url(path) {
            return Some(MediaRef::Url(path.to_string()));
        }
        if !self.ctx.cache.exists(path) {
            debug!("Event {}: preview {} does not exist, skipped", self.event_id, path);
            return None;
        }
        Some(self.ctx.cache.source(path))
    }

    fn photo(&self, path: &str) -> (Body, Option<String>) {
        match self.resolve(path) {
            Some((file, attachment)) => (
                Body::Photo {
                    file,
                    caption: self.caption(),
                },
                attachment,
            ),
            None => (self.plain_text(), None),
        }
    }

    fn parametric_photo(&self, user: UserId) -> Body {
        let Some(feature) = &self.ctx.features.user_input else {
            warn!("Event {}: parametric image needs the user input feature", self.event_id);
            return self.plain_text();
        };

        let input = match feature.stored_input(user) {
            Some(Ok(input)) => input,
            Some(Err(e)) => {
                warn!("Event {}: get input of user {}: {}", self.event_id, user, e);
                return self.plain_text();
            }
            None => {
                warn!("Event {}: user input feature has no input source", self.event_id);
                return self.plain_text();
            }
        };

        let image_data = &self.event.message.image_data;
        if image_data.argument_type != USER_INPUT_ARGUMENT {
            warn!(
                "Event {}: unknown image argument type {:?}",
                self.event_id, image_data.argument_type
            );
        }
        let Some(url) = image_data.url_for(&input) else {
            warn!(
                "Event {}: image url format {:?} has no placeholder",
                self.event_id, image_data.url_format
            );
            return self.plain_text();
        };

        Body::Photo {
            file: MediaRef::Url(url),
            caption: self.caption(),
        }
    }

    fn document(&self, file: &FileData) -> (Body, Option<String>) {
        let Some((source, attachment)) = self.resolve(&file.path) else {
            return (Body::Text(UPLOAD_FAILED_TEXT.to_string()), None);
        };
        (
            Body::Document {
                file: source,
                file_name: non_empty(&file.name),
                caption: self.caption(),
                thumbnail: self.thumbnail(&file.preview_image_path),
            },
            attachment,
        )
    }

    fn video(&self, video: &VideoData) -> (Body, Option<String>) {
        let Some((source, attachment)) = self.resolve(&video.path) else {
            return (Body::Text(UPLOAD_FAILED_TEXT.to_string()), None);
        };
        let file_name = Path::new(&video.path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        (
            Body::Video {
                file: source,
                file_name,
                width: video.width,
                height: video.height,
                caption: self.caption(),
                thumbnail: self.thumbnail(&video.preview_image_path),
            },
            attachment,
        )
    }

    fn audio(&self, audio: &AudioData) -> (Body, Option<String>) {
        let Some((source, attachment)) = self.resolve(&audio.path) else {
            return (self.plain_text(), None);
        };
        (
            Body::Audio {
                file: source,
                file_name: non_empty(&audio.name),
                duration: (audio.duration > 0).then_some(audio.duration),
                caption: self.caption(),
            },
            attachment,
        )
    }

    fn build_keyboard(&self, user: UserId) -> Keyboard {
        let message = &self.event.message;
        let buttons = message
            .buttons
            .iter()
            .filter_map(|spec| match spec.target() {
                Some(ButtonTarget::Next(event_id)) => Some(InlineButton::Next {
                    label: spec.text.clone(),
                    event_id: event_id.to_string(),
                }),
                Some(ButtonTarget::Url(url)) => Some(InlineButton::Url {
                    label: spec.text.clone(),
                    url: self.link(user, spec, url),
                }),
                None => {
                    warn!("Event {}: button {:?} has no single target", self.event_id, spec.text);
                    None
                }
            })
            .collect();

        layout_buttons(buttons, message.buttons_is_columns, message.buttons_split)
    }

    fn link(&self, user: UserId, spec: &ButtonSpec, url: &str) -> String {
        if !spec.use_utm_tags {
            return url.to_string();
        }
        let Some(source) = &self.ctx.features.attribution else {
            return url.to_string();
        };
        match add_utm_tags(url, &source.attribution_tags(user)) {
            Ok(tagged) => tagged,
            Err(e) => {
                warn!("Event {}: add utm tags: {}", self.event_id, e);
                url.to_string()
            }
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
