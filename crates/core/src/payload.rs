//! Attribution payload carried on the entry command
//!
//! The payload is decoded by `funnelbot-wire`; this module only holds the
//! decoded shape so every crate can pass it around.

use serde::{Deserialize, Serialize};

/// Decoded entry-command payload
///
/// All fields are optional; an empty string means "not set". The serialized
/// keys (`s`, `c`, `t`, `b`, `y`) are the same single-letter keys used by the
/// encoded wire form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPayload {
    /// Attribution source (utm_source)
    #[serde(rename = "s", default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    /// Campaign (utm_campaign)
    #[serde(rename = "c", default, skip_serializing_if = "String::is_empty")]
    pub campaign: String,
    /// Content tag (utm_content)
    #[serde(rename = "t", default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    /// Event to render instead of the entry event
    #[serde(rename = "b", default, skip_serializing_if = "String::is_empty")]
    pub backlink: String,
    /// Ad-network click identifier
    #[serde(rename = "y", default, skip_serializing_if = "String::is_empty")]
    pub click_id: String,
}

impl UserPayload {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
            && self.campaign.is_empty()
            && self.content.is_empty()
            && self.backlink.is_empty()
            && self.click_id.is_empty()
    }

    /// Backlink event identifier, if one was supplied
    pub fn backlink(&self) -> Option<&str> {
        if self.backlink.is_empty() {
            None
        } else {
            Some(&self.backlink)
        }
    }
}

impl std::fmt::Display for UserPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => f.write_str("{}"),
        }
    }
}
