//! In-memory transport for unit tests

use funnelbot_core::{
    ChannelId, ChatAction, Error, MediaRef, MemberRole, MembershipLookup, OutboundMessage,
    RemoteFile, Result, SentMessage, Transport, Trigger, UserId,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

/// Transport that records every call
#[derive(Default)]
pub(crate) struct RecordingTransport {
    pub sent: Mutex<Vec<(UserId, OutboundMessage)>>,
    pub actions: Mutex<Vec<(UserId, ChatAction)>>,
    pub pinned: Mutex<Vec<SentMessage>>,
    pub registered: Mutex<Vec<Trigger>>,
    pub answered: Mutex<Vec<String>>,
    pub roles: Mutex<HashMap<UserId, MemberRole>>,
    pub fail_send: AtomicBool,
    pub fail_pin: AtomicBool,
    next_id: AtomicI64,
}

impl RecordingTransport {
    pub fn with_role(self, user: UserId, role: MemberRole) -> Self {
        self.roles.lock().insert(user, role);
        self
    }

    pub fn sent_bodies(&self) -> Vec<funnelbot_core::Body> {
        self.sent.lock().iter().map(|(_, m)| m.body.clone()).collect()
    }
}

impl MembershipLookup for RecordingTransport {
    fn member_role(&self, _channel: ChannelId, user: UserId) -> Result<MemberRole> {
        Ok(self.roles.lock().get(&user).cloned().unwrap_or(MemberRole::Left))
    }
}

impl Transport for RecordingTransport {
    fn register(&self, trigger: &Trigger) -> Result<()> {
        self.registered.lock().push(trigger.clone());
        Ok(())
    }

    fn send(&self, recipient: UserId, message: &OutboundMessage) -> Result<SentMessage> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(Error::external("send", "network unreachable"));
        }
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let media = message.body.media().and_then(|media| match media {
            MediaRef::Remote(file) => Some(file.clone()),
            MediaRef::Disk(_) => Some(RemoteFile {
                file_id: format!("file-{}", message_id),
                unique_id: format!("unique-{}", message_id),
                size: 1,
            }),
            MediaRef::Url(_) => None,
        });
        self.sent.lock().push((recipient, message.clone()));
        Ok(SentMessage {
            message_id,
            chat: recipient,
            media,
        })
    }

    fn notify(&self, recipient: UserId, action: ChatAction) -> Result<()> {
        self.actions.lock().push((recipient, action));
        Ok(())
    }

    fn pin(&self, message: &SentMessage) -> Result<()> {
        if self.fail_pin.load(Ordering::SeqCst) {
            return Err(Error::external("pin", "not enough rights"));
        }
        self.pinned.lock().push(message.clone());
        Ok(())
    }

    fn answer_callback(&self, callback_id: &str) -> Result<()> {
        self.answered.lock().push(callback_id.to_string());
        Ok(())
    }
}
