//! Bind-time script validation

use crate::features::UserInputFeature;
use funnelbot_core::{ButtonTarget, Error, Result, Script};

/// Check every cross-reference in `script`
///
/// All problems are collected into one [`Error::Validation`].
pub fn validate_script(script: &Script, user_input: Option<&UserInputFeature>) -> Result<()> {
    let mut problems = Vec::new();

    let mut events: Vec<_> = script.iter().collect();
    events.sort_unstable_by_key(|(id, _)| *id);

    for (id, event) in events {
        for button in &event.message.buttons {
            match button.target() {
                Some(ButtonTarget::Next(next)) if !script.contains(next) => problems.push(format!(
                    "event {:?}: button {:?} leads to unknown event {:?}",
                    id, button.text, next
                )),
                Some(_) => {}
                None => problems.push(format!(
                    "event {:?}: button {:?} must set exactly one of nextID and url",
                    id, button.text
                )),
            }
        }

        let locker = &event.locker;
        if !locker.enabled {
            continue;
        }
        if locker.fallback_event == id {
            problems.push(format!("event {:?}: locker falls back to itself", id));
            continue;
        }
        match script.get(&locker.fallback_event) {
            None => problems.push(format!(
                "event {:?}: locker fallback {:?} does not exist",
                id, locker.fallback_event
            )),
            Some(fallback) if fallback.locker.enabled => problems.push(format!(
                "event {:?}: locker fallback {:?} is locked itself",
                id, locker.fallback_event
            )),
            Some(_) => {}
        }
    }

    if let Some(feature) = user_input {
        for (role, event_id) in [
            ("verified", feature.verified_event()),
            ("invalid", feature.invalid_event()),
        ] {
            if !event_id.is_empty() && !script.contains(event_id) {
                problems.push(format!("user input {} event {:?} does not exist", role, event_id));
            }
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(problems.join("; ")))
    }
}
