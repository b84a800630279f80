//! Trigger table
//!
//! Built once from the script at bind time. Identifiers starting with `/` are
//! commands; every other identifier answers both a button callback and a
//! case-insensitive text trigger.

use funnelbot_core::{Script, Trigger};
use std::collections::HashMap;

/// Trigger → event identifier
#[derive(Debug, Clone, Default)]
pub struct TriggerTable {
    commands: HashMap<String, String>,
    callbacks: HashMap<String, String>,
    /// Lowercased identifier → identifier
    texts: HashMap<String, String>,
}

impl TriggerTable {
    /// Table for every event of `script`
    pub fn from_script(script: &Script) -> Self {
        let mut ids: Vec<&str> = script.iter().map(|(id, _)| id).collect();
        ids.sort_unstable();

        let mut table = TriggerTable::default();
        for id in ids {
            if id.starts_with('/') {
                table.commands.insert(id.to_string(), id.to_string());
            } else {
                table.callbacks.insert(id.to_string(), id.to_string());
            }
            table.insert_text(id);
        }
        table
    }

    fn insert_text(&mut self, id: &str) {
        let key = id.to_lowercase();
        // an identifier that is already lowercase owns its text trigger
        if key == id {
            self.texts.insert(key, id.to_string());
        } else {
            self.texts.entry(key).or_insert_with(|| id.to_string());
        }
    }

    /// Every trigger, sorted
    pub fn triggers(&self) -> Vec<Trigger> {
        let mut commands: Vec<&String> = self.commands.keys().collect();
        commands.sort();
        let mut callbacks: Vec<&String> = self.callbacks.keys().collect();
        callbacks.sort();

        let mut triggers: Vec<Trigger> = commands
            .into_iter()
            .map(|c| Trigger::Command(c.clone()))
            .collect();
        for id in callbacks {
            triggers.push(Trigger::Callback(id.clone()));
            let key = id.to_lowercase();
            if self.texts.get(&key) == Some(id) {
                triggers.push(Trigger::Text(key));
            }
        }
        triggers
    }

    /// Event for a command token (slash included)
    pub fn command(&self, command: &str) -> Option<&str> {
        self.commands.get(command).map(String::as_str)
    }

    /// Event for button callback data
    pub fn callback(&self, data: &str) -> Option<&str> {
        self.callbacks.get(data).map(String::as_str)
    }

    /// Event for free text, compared case-insensitively
    ///
    /// Command identifiers match too, so `/HELP` finds `/help`. Only non-command
    /// identifiers are announced as text triggers.
    pub fn text(&self, text: &str) -> Option<&str> {
        self.texts.get(&text.to_lowercase()).map(String::as_str)
    }

    /// Number of events reachable through the table
    pub fn len(&self) -> usize {
        self.commands.len() + self.callbacks.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
