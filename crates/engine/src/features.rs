//! Optional funnel features
//!
//! Every feature is off until attached on the [`FunnelBuilder`](crate::FunnelBuilder).

use funnelbot_core::{
    AttributionSource, CommandSink, ConversionSink, Error, Result, Sender, UserId, UserProfile,
    UserStore, WebAppSink,
};
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

type VerifiedCallback = Arc<dyn Fn(UserId, &str) + Send + Sync>;
type InputSource = Arc<dyn Fn(UserId) -> Result<String> + Send + Sync>;

/// Free-form input validation
///
/// Text that matches no script event and no custom command is checked against
/// a pattern. A match renders the verified event, anything else the invalid
/// event. An empty event identifier skips the reply.
#[derive(Clone)]
pub struct UserInputFeature {
    pattern: Regex,
    verified_event: String,
    invalid_event: String,
    on_verified: Option<VerifiedCallback>,
    input_source: Option<InputSource>,
}

impl UserInputFeature {
    /// Compile `pattern`; an invalid pattern is a configuration error
    pub fn new(
        pattern: &str,
        verified_event: impl Into<String>,
        invalid_event: impl Into<String>,
    ) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            Error::Configuration(format!("invalid user input pattern {:?}: {}", pattern, e))
        })?;
        Ok(UserInputFeature {
            pattern,
            verified_event: verified_event.into(),
            invalid_event: invalid_event.into(),
            on_verified: None,
            input_source: None,
        })
    }

    /// Builder: run `callback` with every verified input
    pub fn with_verified_callback(
        mut self,
        callback: impl Fn(UserId, &str) + Send + Sync + 'static,
    ) -> Self {
        self.on_verified = Some(Arc::new(callback));
        self
    }

    /// Builder: source of a user's stored input, used by parametric images
    pub fn with_input_source(
        mut self,
        source: impl Fn(UserId) -> Result<String> + Send + Sync + 'static,
    ) -> Self {
        self.input_source = Some(Arc::new(source));
        self
    }

    /// Check if `input` matches the pattern
    pub fn is_match(&self, input: &str) -> bool {
        self.pattern.is_match(input)
    }

    /// Event rendered after a match
    pub fn verified_event(&self) -> &str {
        &self.verified_event
    }

    /// Event rendered after a mismatch
    pub fn invalid_event(&self) -> &str {
        &self.invalid_event
    }

    pub(crate) fn notify_verified(&self, user: UserId, input: &str) {
        if let Some(callback) = &self.on_verified {
            callback(user, input);
        }
    }

    /// Stored input for `user`, `None` without an input source
    pub(crate) fn stored_input(&self, user: UserId) -> Option<Result<String>> {
        self.input_source.as_ref().map(|source| source(user))
    }
}

impl std::fmt::Debug for UserInputFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserInputFeature")
            .field("pattern", &self.pattern.as_str())
            .field("verified_event", &self.verified_event)
            .field("invalid_event", &self.invalid_event)
            .finish()
    }
}

/// Features attached to a funnel
#[derive(Clone, Default)]
pub(crate) struct Features {
    pub users: Option<Arc<dyn UserStore>>,
    pub attribution: Option<Arc<dyn AttributionSource>>,
    pub conversions: Option<Arc<dyn ConversionSink>>,
    pub commands: Option<Arc<dyn CommandSink>>,
    pub user_input: Option<UserInputFeature>,
    pub web_app: Option<Arc<dyn WebAppSink>>,
}

/// Find the sender's profile, saving a new one when absent
///
/// Returns the store-assigned identifier.
pub(crate) fn ensure_user(store: &dyn UserStore, sender: &Sender) -> Result<i64> {
    if let Some(profile) = store.find_by_external_id(sender.id)? {
        if let Some(id) = profile.id {
            return Ok(id);
        }
    }

    let profile = UserProfile::from_sender(sender);
    let id = store.save(&profile)?;
    debug!("Saved user {} as {}", sender.id, id);
    Ok(id)
}
