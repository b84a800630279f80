//! Feature Tests
//!
//! User store, broadcast, event hooks, render overrides, attribution links
//! and conversions.

use crate::*;
use funnelbot_core::InlineButton;

// =============================================================================
// USER STORE
// =============================================================================

#[test]
fn test_new_user_is_saved_once() {
    let transport = RecordingTransport::new();
    let users = Arc::new(MemoryUsers::default());
    let funnel = builder(&transport).users(Arc::clone(&users)).bind().unwrap();

    let sender = Sender {
        first_name: "Ann".into(),
        username: "ann".into(),
        ..Sender::new(42)
    };
    funnel
        .handle_update(&Update::message(sender.clone(), "/start"))
        .unwrap();
    funnel
        .handle_update(&Update::callback(sender, "cb-1", "howItWorks"))
        .unwrap();

    assert_eq!(users.saves.load(Ordering::SeqCst), 1);
    let profiles = users.profiles.lock();
    assert_eq!(profiles[0].external_id, UserId(42));
    assert_eq!(profiles[0].handle, "@ann");
}

#[test]
fn test_known_user_is_not_saved_again() {
    let transport = RecordingTransport::new();
    let users = MemoryUsers::with_users(&[7]);
    let funnel = builder(&transport).users(Arc::clone(&users)).bind().unwrap();

    funnel.handle_update(&message(7, "/help")).unwrap();

    assert_eq!(users.saves.load(Ordering::SeqCst), 0);
}

// =============================================================================
// BROADCAST
// =============================================================================

#[test]
fn test_broadcast_counts_delivered_messages() {
    let transport = RecordingTransport::new();
    transport.blocked.lock().insert(UserId(2));
    let users = MemoryUsers::with_users(&[1, 2, 3]);
    let funnel = builder(&transport).users(Arc::clone(&users)).bind().unwrap();

    let delivered = funnel.broadcast_event("/help").unwrap();

    assert_eq!(delivered, 2);
    let recipients: Vec<UserId> = transport.sent.lock().iter().map(|(user, _)| *user).collect();
    assert_eq!(recipients, vec![UserId(1), UserId(3)]);
    assert_eq!(users.saves.load(Ordering::SeqCst), 0);
}

#[test]
fn test_broadcast_of_unknown_event_fails() {
    let transport = RecordingTransport::new();
    let funnel = builder(&transport)
        .users(MemoryUsers::with_users(&[1]))
        .bind()
        .unwrap();

    assert!(funnel.broadcast_event("missing").is_err());
    assert_eq!(transport.sent_count(), 0);
}

#[test]
fn test_broadcast_respects_lockers() {
    let transport = RecordingTransport::new();
    transport.set_role(UserId(1), MemberRole::Member);
    let funnel = builder(&transport)
        .users(MemoryUsers::with_users(&[1, 2]))
        .bind()
        .unwrap();

    assert_eq!(funnel.broadcast_event("premium").unwrap(), 2);
    assert_eq!(
        transport.texts(),
        vec!["Premium content", "Subscribe to the channel first"]
    );
}

// =============================================================================
// HOOKS AND OVERRIDES
// =============================================================================

#[test]
fn test_event_hook_runs_before_send() {
    let transport = RecordingTransport::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let mut script = script();
    script.get_mut("/help").unwrap().message.on_event =
        Some(EventHook::new(move |user, event_id| {
            sink.lock().push((user, event_id.to_string()));
            Ok(())
        }));
    let funnel = builder(&transport).script(script).bind().unwrap();

    funnel.handle_update(&message(4, "/help")).unwrap();

    assert_eq!(seen.lock().as_slice(), &[(UserId(4), "/help".to_string())]);
    assert_eq!(transport.texts(), vec!["Help text"]);
}

#[test]
fn test_failing_hook_aborts_delivery() {
    let transport = RecordingTransport::new();
    let mut script = script();
    script.get_mut("/help").unwrap().message.on_event = Some(EventHook::new(|_, _| {
        Err(Error::external("audit log", "unavailable"))
    }));
    let funnel = builder(&transport).script(script).bind().unwrap();

    let err = funnel.handle_update(&message(4, "/help")).unwrap_err();

    assert!(err.is_external());
    assert_eq!(transport.sent_count(), 0);
}

#[test]
fn test_render_override_replaces_content() {
    let transport = RecordingTransport::new();
    let (log, sink) = conversion_log();
    let mut script = script();
    script.get_mut("howItWorks").unwrap().message.render = Some(RenderOverride::new(|user| {
        Body::Text(format!("Hello, user {}", user))
    }));
    let funnel = builder(&transport)
        .script(script)
        .conversions(sink)
        .bind()
        .unwrap();

    funnel.handle_update(&press(9, "howItWorks")).unwrap();

    assert_eq!(transport.last_message().body, text_body("Hello, user 9"));
    assert!(log.lock().is_empty());
}

// =============================================================================
// ATTRIBUTION
// =============================================================================

fn site_url(message: &OutboundMessage) -> String {
    match &message.keyboard[1][0] {
        InlineButton::Url { url, .. } => url.clone(),
        other => panic!("expected a url button, got {:?}", other),
    }
}

#[test]
fn test_link_buttons_carry_utm_tags() {
    let transport = RecordingTransport::new();
    let funnel = builder(&transport)
        .attribution(|user: UserId| AttributionTags {
            source: "bot".into(),
            campaign: format!("user{}", user),
            content: String::new(),
        })
        .bind()
        .unwrap();

    funnel.handle_update(&message(3, "/start")).unwrap();

    assert_eq!(
        site_url(&transport.last_message()),
        "https://example.com/landing?utm_source=bot&utm_campaign=user3"
    );
}

#[test]
fn test_link_buttons_untouched_without_attribution() {
    let transport = RecordingTransport::new();
    let funnel = builder(&transport)
        .attribution(|_: UserId| AttributionTags::default())
        .bind()
        .unwrap();

    funnel.handle_update(&message(3, "/start")).unwrap();

    assert_eq!(
        site_url(&transport.last_message()),
        "https://example.com/landing"
    );
}

#[test]
fn test_conversion_failure_does_not_block_delivery() {
    let transport = RecordingTransport::new();
    let funnel = builder(&transport)
        .conversions(|_: UserId, _: &str, _: &UserPayload| -> Result<()> {
            Err(Error::external("analytics", "timeout"))
        })
        .bind()
        .unwrap();

    funnel.handle_update(&press(1, "howItWorks")).unwrap();

    assert_eq!(transport.texts(), vec!["Step by step"]);
}

#[test]
fn test_conversions_use_the_delivered_event() {
    let transport = RecordingTransport::new();
    let (log, sink) = conversion_log();
    let funnel = builder(&transport).conversions(sink).bind().unwrap();

    funnel.handle_update(&press(1, "premium")).unwrap();
    funnel.handle_update(&press(1, "howItWorks")).unwrap();

    let tags: Vec<String> = log.lock().iter().map(|c| c.tag.clone()).collect();
    assert_eq!(tags, vec!["lead", "howto"]);
    assert!(log.lock().iter().all(|c| c.user == UserId(1)));
}
