//! Inbound updates and trigger patterns

use crate::types::UserId;

/// Author of an inbound update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sender {
    /// Platform user identifier
    pub id: UserId,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Username without the leading `@`
    pub username: String,
}

impl Sender {
    /// Sender with only an identifier
    pub fn new(id: impl Into<UserId>) -> Self {
        Sender {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Display name: first and last name, or `anonymous`
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            "anonymous".to_string()
        } else {
            name.to_string()
        }
    }
}

/// One inbound update delivered by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// Text message (commands included)
    Message {
        /// Author
        sender: Sender,
        /// Raw message text
        text: String,
    },
    /// Inline button press
    Callback {
        /// Author
        sender: Sender,
        /// Platform callback identifier, used for the acknowledgement
        id: String,
        /// Callback data (destination event identifier)
        data: String,
    },
    /// Data sent back by a web app launched from the chat
    WebApp {
        /// Author
        sender: Sender,
        /// Raw payload posted by the web app
        data: String,
    },
}

impl Update {
    /// Text message update
    pub fn message(sender: Sender, text: impl Into<String>) -> Self {
        Update::Message {
            sender,
            text: text.into(),
        }
    }

    /// Button press update
    pub fn callback(sender: Sender, id: impl Into<String>, data: impl Into<String>) -> Self {
        Update::Callback {
            sender,
            id: id.into(),
            data: data.into(),
        }
    }

    /// Web app data update
    pub fn web_app(sender: Sender, data: impl Into<String>) -> Self {
        Update::WebApp {
            sender,
            data: data.into(),
        }
    }

    /// Author of the update
    pub fn sender(&self) -> &Sender {
        match self {
            Update::Message { sender, .. }
            | Update::Callback { sender, .. }
            | Update::WebApp { sender, .. } => sender,
        }
    }
}

/// Pattern a transport should route to the funnel
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Slash command, e.g. `/start`
    Command(String),
    /// Inline button callback data
    Callback(String),
    /// Exact text, compared case-insensitively
    Text(String),
    /// Web app data
    WebApp,
}
