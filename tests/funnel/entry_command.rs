//! Entry Command Tests
//!
//! Payload decoding, backlink resolution and fallbacks for `/start`.

use crate::*;
use funnelbot::encode_payload;

fn bind_with_conversions(
    transport: &Arc<RecordingTransport>,
) -> (Funnel, Arc<Mutex<Vec<Conversion>>>) {
    let (log, sink) = conversion_log();
    let funnel = builder(transport).conversions(sink).bind().unwrap();
    (funnel, log)
}

// =============================================================================
// PLAIN ENTRY
// =============================================================================

#[test]
fn test_start_without_payload_renders_entry_event() {
    let transport = RecordingTransport::new();
    let (funnel, log) = bind_with_conversions(&transport);

    funnel.handle_update(&message(1, "/start")).unwrap();

    assert_eq!(transport.texts(), vec!["Welcome!"]);
    let log = log.lock();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].tag, "start");
    assert!(log[0].payload.is_empty());
}

#[test]
fn test_start_with_bot_suffix() {
    let transport = RecordingTransport::new();
    let funnel = bind(&transport);

    funnel.handle_update(&message(1, "/start@funnel_bot")).unwrap();

    assert_eq!(transport.texts(), vec!["Welcome!"]);
}

#[test]
fn test_entry_keyboard_in_column_mode() {
    let transport = RecordingTransport::new();
    let funnel = bind(&transport);

    funnel.handle_update(&message(1, "/start")).unwrap();

    let keyboard = transport.last_message().keyboard;
    assert_eq!(keyboard.len(), 2);
    assert_eq!(keyboard[0][0].label(), "How it works");
    assert_eq!(keyboard[1][0].label(), "Site");
}

// =============================================================================
// ATTRIBUTION PAYLOADS
// =============================================================================

#[test]
fn test_delimited_payload_reaches_conversions() {
    let transport = RecordingTransport::new();
    let (funnel, log) = bind_with_conversions(&transport);

    funnel.handle_update(&message(1, "/start yandex_search_100")).unwrap();

    let log = log.lock();
    assert_eq!(log[0].payload.source, "yandex");
    assert_eq!(log[0].payload.campaign, "search");
    assert_eq!(log[0].payload.click_id, "100");
    assert_eq!(transport.texts(), vec!["Welcome!"]);
}

#[test]
fn test_encoded_payload_reaches_conversions() {
    let transport = RecordingTransport::new();
    let (funnel, log) = bind_with_conversions(&transport);

    funnel
        .handle_update(&message(1, "/start cz12ayZjPXByb21vJnQ9YmFubmVyMg"))
        .unwrap();

    let payload = &log.lock()[0].payload;
    assert_eq!(payload.source, "vk");
    assert_eq!(payload.campaign, "promo");
    assert_eq!(payload.content, "banner2");
}

#[test]
fn test_oversized_payload_falls_back_to_empty() {
    let transport = RecordingTransport::new();
    let (funnel, log) = bind_with_conversions(&transport);

    let raw = format!("dzen_{}", "1".repeat(200));
    funnel.handle_update(&message(1, &format!("/start {}", raw))).unwrap();

    assert_eq!(transport.texts(), vec!["Welcome!"]);
    assert!(log.lock()[0].payload.is_empty());
}

#[test]
fn test_undecodable_payload_falls_back_to_empty() {
    let transport = RecordingTransport::new();
    let (funnel, log) = bind_with_conversions(&transport);

    funnel.handle_update(&message(1, "/start nodelimiter!")).unwrap();

    assert_eq!(transport.texts(), vec!["Welcome!"]);
    assert!(log.lock()[0].payload.is_empty());
}

// =============================================================================
// BACKLINKS
// =============================================================================

#[test]
fn test_delimited_backlink_renders_target_event() {
    let transport = RecordingTransport::new();
    let (funnel, log) = bind_with_conversions(&transport);

    funnel.handle_update(&message(1, "/start howItWorks_back")).unwrap();

    assert_eq!(transport.texts(), vec!["Step by step"]);
    let log = log.lock();
    let tags: Vec<&str> = log.iter().map(|c| c.tag.as_str()).collect();
    assert_eq!(tags, vec!["lead", "howto"]);
    assert_eq!(log[0].payload.backlink, "howItWorks");
}

#[test]
fn test_encoded_backlink_renders_target_event() {
    let transport = RecordingTransport::new();
    let funnel = bind(&transport);

    let payload = UserPayload {
        source: "dzen".into(),
        campaign: "org".into(),
        backlink: "premium".into(),
        ..Default::default()
    };
    transport.set_role(UserId(1), MemberRole::Member);
    funnel
        .handle_update(&message(1, &format!("/start {}", encode_payload(&payload))))
        .unwrap();

    assert_eq!(transport.texts(), vec!["Premium content"]);
}

#[test]
fn test_backlink_target_is_still_gated() {
    let transport = RecordingTransport::new();
    let funnel = bind(&transport);

    funnel.handle_update(&message(1, "/start premium_back")).unwrap();

    assert_eq!(transport.texts(), vec!["Subscribe to the channel first"]);
}

#[test]
fn test_backlink_matches_case_insensitively() {
    let transport = RecordingTransport::new();
    let funnel = bind(&transport);

    funnel.handle_update(&message(1, "/start PHOTO_back")).unwrap();

    // `photo` has a missing image, which degrades to its caption
    assert_eq!(transport.texts(), vec!["Look"]);
}

#[test]
fn test_unknown_backlink_renders_entry_with_empty_payload() {
    let transport = RecordingTransport::new();
    let (funnel, log) = bind_with_conversions(&transport);

    funnel.handle_update(&message(1, "/start nowhere_back")).unwrap();

    assert_eq!(transport.texts(), vec!["Welcome!"]);
    assert!(log.lock()[0].payload.is_empty());
}

#[test]
fn test_cyrillic_payload_is_truncated_by_characters() {
    let transport = RecordingTransport::new();
    let (funnel, log) = bind_with_conversions(&transport);

    let source = "и".repeat(30);
    funnel
        .handle_update(&message(1, &format!("/start {}_spring", source)))
        .unwrap();

    let payload = &log.lock()[0].payload;
    assert_eq!(payload.source.chars().count(), 24);
    assert_eq!(payload.campaign, "spring");
}
