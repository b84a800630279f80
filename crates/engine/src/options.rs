//! Funnel configuration
//!
//! Options can be set in code with the builder-style setters, or loaded from
//! TOML:
//!
//! ```toml
//! token = "123456:ABC"
//! files_root = "./media"
//! cache_path = "./media/cache.json"
//! entry_event = "/start"
//! default_format = "HTML"
//! ```

use funnelbot_core::{Error, ParseFormat, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default entry command
pub const DEFAULT_ENTRY_EVENT: &str = "/start";

/// Funnel configuration
#[derive(Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FunnelOptions {
    /// Bot token; must be non-empty
    pub token: String,
    /// Directory local media paths are resolved against
    pub files_root: PathBuf,
    /// Media cache snapshot file; caching is disabled when unset
    pub cache_path: Option<PathBuf>,
    /// Event identifier of the entry command
    pub entry_event: String,
    /// Text format for events that do not declare one
    pub default_format: ParseFormat,
}

impl Default for FunnelOptions {
    fn default() -> Self {
        FunnelOptions {
            token: String::new(),
            files_root: PathBuf::from("."),
            cache_path: None,
            entry_event: DEFAULT_ENTRY_EVENT.to_string(),
            default_format: ParseFormat::Markdown,
        }
    }
}

impl FunnelOptions {
    /// Options with the given token and defaults otherwise
    pub fn new(token: impl Into<String>) -> Self {
        FunnelOptions {
            token: token.into(),
            ..Default::default()
        }
    }

    /// Parse options from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Configuration(format!("parse options: {}", e)))
    }

    /// Load options from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("read options file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Builder: set the files root
    pub fn files_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.files_root = root.into();
        self
    }

    /// Builder: enable the media cache at `path`
    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Builder: set the entry event identifier
    pub fn entry_event(mut self, id: impl Into<String>) -> Self {
        self.entry_event = id.into();
        self
    }

    /// Builder: set the default text format
    pub fn default_format(mut self, format: ParseFormat) -> Self {
        self.default_format = format;
        self
    }

    /// Check the options that do not depend on the script
    pub(crate) fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(Error::Configuration("bot token is empty".into()));
        }
        if self.entry_event.is_empty() {
            return Err(Error::Configuration("entry event is empty".into()));
        }
        Ok(())
    }

    /// Cache path, treating an empty path as unset
    pub(crate) fn effective_cache_path(&self) -> Option<&Path> {
        self.cache_path
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }
}

impl std::fmt::Debug for FunnelOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunnelOptions")
            .field("token", &"<redacted>")
            .field("files_root", &self.files_root)
            .field("cache_path", &self.cache_path)
            .field("entry_event", &self.entry_event)
            .field("default_format", &self.default_format)
            .finish()
    }
}
