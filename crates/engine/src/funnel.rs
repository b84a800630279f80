//! Funnel dispatcher
//!
//! [`Funnel`] owns the script, the trigger table and every collaborator. The
//! transport's receive loop hands each inbound update to
//! [`Funnel::handle_update`], which may run on many threads at once.
//!
//! # Routing
//!
//! ```text
//! update ──┬─ callback ─────────────► event (empty payload) ─► answer_callback
//!          ├─ web app ──────────────► web app sink
//!          └─ message ─┬─ entry command ─► EntryState machine ─► event
//!                      ├─ script command ─► event
//!                      └─ free text ─┬─ script event
//!                                    ├─ custom command sink
//!                                    └─ user input (verified / invalid event)
//! ```
//!
//! # Delivery
//!
//! locker check ─► render ─► event hook ─► user profile ─► send ─► pin ─► cache

use crate::features::{ensure_user, Features, UserInputFeature};
use crate::gate::SubscriptionGate;
use crate::options::FunnelOptions;
use crate::query::{QueryHandler, RenderContext, Rendered};
use crate::sanitize::strip_markup;
use crate::triggers::TriggerTable;
use crate::validate::validate_script;
use funnelbot_cache::MediaCache;
use funnelbot_core::{
    AttributionSource, CommandSink, ConversionSink, EventDefinition, Error, Result, Script,
    Sender, SentMessage, Transport, Trigger, Update, UserId, UserPayload, UserStore, WebAppSink,
};
use funnelbot_wire::decode_or_empty;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Progress of one entry command
#[derive(Debug, Clone, PartialEq, Eq)]
enum EntryState {
    /// Entry command received with its raw payload
    Idle(String),
    /// Sanitized payload waiting to be decoded
    Decoding(String),
    /// Decoded payload names a backlink event
    ResolvingBacklink(UserPayload),
    /// Final event and payload
    Rendering {
        event_id: String,
        payload: UserPayload,
    },
}

/// Scripted conversation funnel
pub struct Funnel {
    options: FunnelOptions,
    script: Script,
    triggers: TriggerTable,
    ctx: RenderContext,
}

impl Funnel {
    /// Start configuring a funnel
    pub fn builder() -> FunnelBuilder {
        FunnelBuilder::new()
    }

    /// Options the funnel was bound with
    pub fn options(&self) -> &FunnelOptions {
        &self.options
    }

    /// Normalized script
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Trigger table
    pub fn triggers(&self) -> &TriggerTable {
        &self.triggers
    }

    /// Media cache
    pub fn cache(&self) -> &MediaCache {
        &self.ctx.cache
    }

    /// Renderer for `event_id`
    pub fn query_handler(&self, event_id: &str) -> Result<QueryHandler<'_>> {
        let (id, event) = self.event(event_id)?;
        Ok(QueryHandler::new(&self.ctx, id, event))
    }

    /// Handle one inbound update
    pub fn handle_update(&self, update: &Update) -> Result<()> {
        match update {
            Update::Callback { sender, id, data } => {
                let result = match self.triggers.callback(data) {
                    Some(event_id) => self.handle_event(sender, event_id, &UserPayload::default()),
                    None => {
                        debug!("Callback {:?} from user {} matches no event", data, sender.id);
                        Ok(())
                    }
                };
                if let Err(e) = self.ctx.transport.answer_callback(id) {
                    warn!("Answer callback {} failed: {}", id, e);
                }
                result
            }
            Update::Message { sender, text } => self.handle_message(sender, text),
            Update::WebApp { sender, data } => match &self.ctx.features.web_app {
                Some(sink) => sink.handle_web_app(sender, data),
                None => {
                    debug!("Web app data from user {} ignored, no handler", sender.id);
                    Ok(())
                }
            },
        }
    }

    /// Deliver `event_id` to `sender` with `payload`
    pub fn handle_event(&self, sender: &Sender, event_id: &str, payload: &UserPayload) -> Result<()> {
        self.deliver(sender.id, Some(sender), event_id, payload)
    }

    /// Push `event_id` to `user` outside of an inbound update
    pub fn send_event(&self, user: UserId, event_id: &str) -> Result<()> {
        self.deliver(user, None, event_id, &UserPayload::default())
    }

    /// Push `event_id` to every stored user
    ///
    /// Returns the number of successful deliveries. Failures for single
    /// recipients are logged and skipped.
    pub fn broadcast_event(&self, event_id: &str) -> Result<usize> {
        let users = self
            .ctx
            .features
            .users
            .as_ref()
            .ok_or_else(|| Error::Configuration("broadcast requires a user store".into()))?;
        self.event(event_id)?;

        let recipients = users.list_external_ids()?;
        let mut delivered = 0;
        for user in &recipients {
            match self.send_event(*user, event_id) {
                Ok(()) => delivered += 1,
                Err(e) => warn!("Broadcast {} to user {} failed: {}", event_id, user, e),
            }
        }

        info!("Broadcast {}: {}/{} delivered", event_id, delivered, recipients.len());
        Ok(delivered)
    }

    fn event(&self, event_id: &str) -> Result<(&str, &EventDefinition)> {
        self.script
            .get_key_value(event_id)
            .ok_or_else(|| Error::Validation(format!("event {:?} does not exist", event_id)))
    }

    fn handle_message(&self, sender: &Sender, text: &str) -> Result<()> {
        let trimmed = text.trim();
        if trimmed.starts_with('/') {
            let (command, rest) = split_command(trimmed);
            if command == self.options.entry_event {
                let (event_id, payload) = self.resolve_entry(rest);
                return self.handle_event(sender, &event_id, &payload);
            }
            if let Some(event_id) = self.triggers.command(command) {
                return self.handle_event(sender, event_id, &UserPayload::default());
            }
        }
        self.handle_text(sender, trimmed)
    }

    /// Run the entry-command state machine to a single event
    fn resolve_entry(&self, raw: &str) -> (String, UserPayload) {
        let entry = || EntryState::Rendering {
            event_id: self.options.entry_event.clone(),
            payload: UserPayload::default(),
        };

        let mut state = EntryState::Idle(raw.to_string());
        loop {
            state = match state {
                EntryState::Idle(raw) if raw.is_empty() => entry(),
                EntryState::Idle(raw) => EntryState::Decoding(strip_markup(&raw).trim().to_string()),
                EntryState::Decoding(raw) => match decode_or_empty(&raw) {
                    (_, Some(e)) => {
                        warn!("Decode payload {:?}: {}", raw, e);
                        entry()
                    }
                    (payload, None) if payload.backlink().is_some() => {
                        EntryState::ResolvingBacklink(payload)
                    }
                    (payload, None) => EntryState::Rendering {
                        event_id: self.options.entry_event.clone(),
                        payload,
                    },
                },
                EntryState::ResolvingBacklink(payload) => match self.find_backlink(&payload.backlink) {
                    Some(event_id) => EntryState::Rendering { event_id, payload },
                    None => {
                        warn!("Backlink event {:?} not found", payload.backlink);
                        entry()
                    }
                },
                EntryState::Rendering { event_id, payload } => return (event_id, payload),
            };
        }
    }

    /// Backlink target, lowercase identifier first
    fn find_backlink(&self, backlink: &str) -> Option<String> {
        let lower = backlink.to_lowercase();
        if self.script.contains(&lower) {
            return Some(lower);
        }
        if self.script.contains(backlink) {
            return Some(backlink.to_string());
        }
        None
    }

    fn handle_text(&self, sender: &Sender, text: &str) -> Result<()> {
        let sanitized = strip_markup(text);
        let sanitized = sanitized.trim();

        if let Some(event_id) = self.triggers.text(sanitized) {
            return self.handle_event(sender, event_id, &UserPayload::default());
        }

        if let Some(commands) = &self.ctx.features.commands {
            if let Some((command, argument)) = self.custom_command(text) {
                return commands.handle_command(sender, command, argument);
            }
        }

        if let Some(feature) = &self.ctx.features.user_input {
            return self.handle_user_input(sender, feature, sanitized);
        }

        debug!("Text from user {} matches no route", sender.id);
        Ok(())
    }

    fn custom_command<'t>(&self, text: &'t str) -> Option<(&'t str, &'t str)> {
        if !text.starts_with('/') {
            return None;
        }
        let (command, argument) = split_command(text);
        if command.eq_ignore_ascii_case(&self.options.entry_event) {
            return None;
        }
        Some((command, argument))
    }

    fn handle_user_input(&self, sender: &Sender, feature: &UserInputFeature, input: &str) -> Result<()> {
        let event_id = if feature.is_match(input) {
            feature.notify_verified(sender.id, input);
            feature.verified_event()
        } else {
            feature.invalid_event()
        };

        if event_id.is_empty() {
            info!("User input event is not set, skipped");
            return Ok(());
        }
        self.handle_event(sender, event_id, &UserPayload::default())
    }

    fn deliver(
        &self,
        user: UserId,
        sender: Option<&Sender>,
        event_id: &str,
        payload: &UserPayload,
    ) -> Result<()> {
        let (requested_id, requested) = self.event(event_id)?;
        let (target_id, target) = self.apply_locker(user, requested_id, requested)?;

        let rendered = QueryHandler::new(&self.ctx, target_id, target).build(user, payload);

        if let Some(hook) = &requested.message.on_event {
            hook.call(user, requested_id)?;
        }

        if let (Some(users), Some(sender)) = (&self.ctx.features.users, sender) {
            ensure_user(users.as_ref(), sender)?;
        }

        let sent = self.ctx.transport.send(user, &rendered.message)?;
        debug!("Event {} delivered to user {} as message {}", target_id, user, sent.message_id);

        if target.message.pin_this_message {
            if let Err(e) = self.ctx.transport.pin(&sent) {
                warn!("Pin message {} for user {} failed: {}", sent.message_id, user, e);
            }
        }

        self.actualize(&rendered, &sent);
        Ok(())
    }

    /// Event to show after evaluating the locker of `event`
    ///
    /// A failed check substitutes the fallback event without checking its own locker.
    fn apply_locker<'s>(
        &'s self,
        user: UserId,
        event_id: &'s str,
        event: &'s EventDefinition,
    ) -> Result<(&'s str, &'s EventDefinition)> {
        let locker = &event.locker;
        if !locker.enabled {
            return Ok((event_id, event));
        }

        let gate = SubscriptionGate::new(self.ctx.transport.as_ref(), locker.channel);
        let passed = match gate.check(user) {
            Ok(passed) => passed,
            Err(e) => {
                warn!("Event {}: subscription check for user {}: {}", event_id, user, e);
                false
            }
        };
        if passed {
            return Ok((event_id, event));
        }

        debug!("Event {} locked for user {}, showing {}", event_id, user, locker.fallback_event);
        self.event(&locker.fallback_event)
    }

    fn actualize(&self, rendered: &Rendered, sent: &SentMessage) {
        let (Some(path), Some(issued)) = (&rendered.attachment, &sent.media) else {
            return;
        };
        if let Err(e) = self.ctx.cache.actualize(path, issued) {
            error!("Update media cache for {}: {}", path, e);
        }
    }
}

impl std::fmt::Debug for Funnel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Funnel")
            .field("options", &self.options)
            .field("events", &self.script.len())
            .field("cache", &self.ctx.cache)
            .finish()
    }
}

/// Split `/command@bot rest` into (`/command`, `rest`)
fn split_command(text: &str) -> (&str, &str) {
    let (token, rest) = match text.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim()),
        None => (text, ""),
    };
    let command = token.split_once('@').map_or(token, |(command, _)| command);
    (command, rest)
}

/// Builder for [`Funnel`]
#[derive(Default)]
pub struct FunnelBuilder {
    options: FunnelOptions,
    script: Script,
    transport: Option<Arc<dyn Transport>>,
    cache: Option<MediaCache>,
    features: Features,
}

impl FunnelBuilder {
    /// Builder with default options and an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the options
    pub fn options(mut self, options: FunnelOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the script
    pub fn script(mut self, script: Script) -> Self {
        self.script = script;
        self
    }

    /// Set the chat transport
    pub fn transport<T: Transport + 'static>(mut self, transport: Arc<T>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use `cache` instead of the one described by the options
    pub fn cache(mut self, cache: MediaCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Enable the users feature
    pub fn users<U: UserStore + 'static>(mut self, store: Arc<U>) -> Self {
        self.features.users = Some(store);
        self
    }

    /// Enable attribution tags on links
    pub fn attribution(mut self, source: impl AttributionSource + 'static) -> Self {
        self.features.attribution = Some(Arc::new(source));
        self
    }

    /// Enable conversion reporting
    pub fn conversions(mut self, sink: impl ConversionSink + 'static) -> Self {
        self.features.conversions = Some(Arc::new(sink));
        self
    }

    /// Enable custom commands
    pub fn custom_commands(mut self, sink: impl CommandSink + 'static) -> Self {
        self.features.commands = Some(Arc::new(sink));
        self
    }

    /// Handle data posted by web apps
    pub fn web_app(mut self, sink: impl WebAppSink + 'static) -> Self {
        self.features.web_app = Some(Arc::new(sink));
        self
    }

    /// Enable free-form input validation
    pub fn user_input(mut self, feature: UserInputFeature) -> Self {
        self.features.user_input = Some(feature);
        self
    }

    /// Validate the configuration and script, then register every trigger
    pub fn bind(self) -> Result<Funnel> {
        let FunnelBuilder {
            options,
            mut script,
            transport,
            cache,
            features,
        } = self;

        options.validate()?;
        let transport =
            transport.ok_or_else(|| Error::Configuration("transport is not set".into()))?;
        if !script.contains(&options.entry_event) {
            return Err(Error::Configuration(format!(
                "entry event {:?} is not in the script",
                options.entry_event
            )));
        }
        validate_script(&script, features.user_input.as_ref())?;

        script.normalize_text();
        let triggers = TriggerTable::from_script(&script);
        for trigger in triggers.triggers() {
            transport.register(&trigger)?;
        }
        if features.web_app.is_some() {
            transport.register(&Trigger::WebApp)?;
        }

        let cache = cache.unwrap_or_else(|| {
            MediaCache::open_path(&options.files_root, options.effective_cache_path())
        });
        info!(
            "Funnel bound: {} events, media cache {}",
            script.len(),
            if cache.is_enabled() { "enabled" } else { "disabled" }
        );

        Ok(Funnel {
            ctx: RenderContext {
                transport,
                cache,
                features,
                default_format: options.default_format,
            },
            options,
            script,
            triggers,
        })
    }
}
