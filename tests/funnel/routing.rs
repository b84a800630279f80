//! Routing Tests
//!
//! Commands, button callbacks, free text, custom commands, user input and web apps.

use crate::*;

// =============================================================================
// TRIGGERS
// =============================================================================

#[test]
fn test_bind_registers_every_trigger() {
    let transport = RecordingTransport::new();
    let funnel = bind(&transport);

    let registered = transport.registered.lock();
    assert!(registered.contains(&Trigger::Command("/start".into())));
    assert!(registered.contains(&Trigger::Command("/help".into())));
    assert!(registered.contains(&Trigger::Callback("howItWorks".into())));
    assert!(registered.contains(&Trigger::Text("howitworks".into())));
    assert!(!registered.contains(&Trigger::Callback("/help".into())));
    assert_eq!(funnel.triggers().len(), funnel.script().len());
}

#[test]
fn test_script_command_routes_to_event() {
    let transport = RecordingTransport::new();
    let funnel = bind(&transport);

    funnel.handle_update(&message(1, "/help")).unwrap();

    assert_eq!(transport.texts(), vec!["Help text"]);
}

#[test]
fn test_callback_routes_and_is_answered() {
    let transport = RecordingTransport::new();
    let funnel = bind(&transport);

    funnel.handle_update(&press(1, "howItWorks")).unwrap();

    assert_eq!(transport.texts(), vec!["Step by step"]);
    assert_eq!(transport.answered.lock().as_slice(), &["cb-howItWorks"]);
}

#[test]
fn test_unknown_callback_is_answered_without_reply() {
    let transport = RecordingTransport::new();
    let funnel = bind(&transport);

    funnel.handle_update(&press(1, "stale-button")).unwrap();

    assert_eq!(transport.sent_count(), 0);
    assert_eq!(transport.answered.lock().len(), 1);
}

// =============================================================================
// FREE TEXT
// =============================================================================

#[test]
fn test_free_text_matches_case_insensitively() {
    let transport = RecordingTransport::new();
    let funnel = bind(&transport);

    funnel.handle_update(&message(1, "  HowItWorks ")).unwrap();
    funnel.handle_update(&message(1, "SUBSCRIBE")).unwrap();

    assert_eq!(
        transport.texts(),
        vec!["Step by step", "Subscribe to the channel first"]
    );
}

#[test]
fn test_free_text_markup_is_stripped() {
    let transport = RecordingTransport::new();
    let funnel = bind(&transport);

    funnel.handle_update(&message(1, "<b>howitworks</b>")).unwrap();

    assert_eq!(transport.texts(), vec!["Step by step"]);
}

#[test]
fn test_unmatched_text_without_features_is_ignored() {
    let transport = RecordingTransport::new();
    let funnel = bind(&transport);

    funnel.handle_update(&message(1, "hello there")).unwrap();
    funnel.handle_update(&message(1, "/unknown")).unwrap();

    assert_eq!(transport.sent_count(), 0);
}

// =============================================================================
// CUSTOM COMMANDS
// =============================================================================

fn bind_with_commands(
    transport: &Arc<RecordingTransport>,
) -> (Funnel, Arc<Mutex<Vec<(UserId, String, String)>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&calls);
    let funnel = builder(transport)
        .custom_commands(move |sender: &Sender, command: &str, argument: &str| -> Result<()> {
            sink.lock()
                .push((sender.id, command.to_string(), argument.to_string()));
            Ok(())
        })
        .bind()
        .unwrap();
    (funnel, calls)
}

#[test]
fn test_custom_command_receives_command_and_argument() {
    let transport = RecordingTransport::new();
    let (funnel, calls) = bind_with_commands(&transport);

    funnel.handle_update(&message(5, "/promo SPRING24")).unwrap();
    funnel.handle_update(&message(5, "/stats")).unwrap();

    assert_eq!(
        calls.lock().as_slice(),
        &[
            (UserId(5), "/promo".to_string(), "SPRING24".to_string()),
            (UserId(5), "/stats".to_string(), String::new()),
        ]
    );
    assert_eq!(transport.sent_count(), 0);
}

#[test]
fn test_script_events_win_over_custom_commands() {
    let transport = RecordingTransport::new();
    let (funnel, calls) = bind_with_commands(&transport);

    funnel.handle_update(&message(5, "/help")).unwrap();
    funnel.handle_update(&message(5, "/start")).unwrap();

    assert!(calls.lock().is_empty());
    assert_eq!(transport.texts(), vec!["Help text", "Welcome!"]);
}

#[test]
fn test_script_commands_match_in_any_case() {
    let transport = RecordingTransport::new();
    let (funnel, calls) = bind_with_commands(&transport);

    funnel.handle_update(&message(5, "/HELP")).unwrap();
    funnel.handle_update(&message(5, "/Start")).unwrap();

    assert!(calls.lock().is_empty());
    assert_eq!(transport.texts(), vec!["Help text", "Welcome!"]);
}

#[test]
fn test_custom_command_failure_is_returned() {
    let transport = RecordingTransport::new();
    let funnel = builder(&transport)
        .custom_commands(|_: &Sender, _: &str, _: &str| -> Result<()> {
            Err(Error::external("command handler", "database is down"))
        })
        .bind()
        .unwrap();

    let err = funnel.handle_update(&message(5, "/promo X")).unwrap_err();
    assert!(err.is_external());
}

// =============================================================================
// USER INPUT
// =============================================================================

fn bind_with_user_input(
    transport: &Arc<RecordingTransport>,
    invalid_event: &str,
) -> (Funnel, Arc<Mutex<Vec<(UserId, String)>>>) {
    let verified = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&verified);
    let feature = UserInputFeature::new(r"^[A-Z]{3}\d{3}$", "codeok", invalid_event)
        .unwrap()
        .with_verified_callback(move |user, input| sink.lock().push((user, input.to_string())));
    let funnel = builder(transport).user_input(feature).bind().unwrap();
    (funnel, verified)
}

#[test]
fn test_verified_input() {
    let transport = RecordingTransport::new();
    let (funnel, verified) = bind_with_user_input(&transport, "codebad");

    funnel.handle_update(&message(3, "ABC123")).unwrap();

    assert_eq!(verified.lock().as_slice(), &[(UserId(3), "ABC123".to_string())]);
    assert_eq!(transport.texts(), vec!["Code accepted"]);
}

#[test]
fn test_invalid_input() {
    let transport = RecordingTransport::new();
    let (funnel, verified) = bind_with_user_input(&transport, "codebad");

    funnel.handle_update(&message(3, "abc")).unwrap();

    assert!(verified.lock().is_empty());
    assert_eq!(transport.texts(), vec!["Code rejected"]);
}

#[test]
fn test_invalid_input_without_event_is_skipped() {
    let transport = RecordingTransport::new();
    let (funnel, _) = bind_with_user_input(&transport, "");

    funnel.handle_update(&message(3, "abc")).unwrap();

    assert_eq!(transport.sent_count(), 0);
}

#[test]
fn test_script_events_win_over_user_input() {
    let transport = RecordingTransport::new();
    let (funnel, verified) = bind_with_user_input(&transport, "codebad");

    funnel.handle_update(&message(3, "howitworks")).unwrap();

    assert!(verified.lock().is_empty());
    assert_eq!(transport.texts(), vec!["Step by step"]);
}

#[test]
fn test_user_input_event_must_exist() {
    let transport = RecordingTransport::new();
    let feature = UserInputFeature::new(".+", "codeok", "missing").unwrap();

    let err = builder(&transport).user_input(feature).bind().unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

// =============================================================================
// WEB APPS
// =============================================================================

#[test]
fn test_web_app_data_reaches_sink() {
    let transport = RecordingTransport::new();
    let posted = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&posted);
    let funnel = builder(&transport)
        .web_app(move |sender: &Sender, data: &str| -> Result<()> {
            sink.lock().push((sender.id, data.to_string()));
            Ok(())
        })
        .bind()
        .unwrap();

    funnel
        .handle_update(&Update::web_app(Sender::new(6), r#"{"plan":"pro"}"#))
        .unwrap();

    assert!(transport.registered.lock().contains(&Trigger::WebApp));
    assert_eq!(
        posted.lock().as_slice(),
        &[(UserId(6), r#"{"plan":"pro"}"#.to_string())]
    );
    assert_eq!(transport.sent_count(), 0);
}

#[test]
fn test_web_app_data_without_sink_is_ignored() {
    let transport = RecordingTransport::new();
    let funnel = bind(&transport);

    funnel
        .handle_update(&Update::web_app(Sender::new(6), "{}"))
        .unwrap();

    assert!(!transport.registered.lock().contains(&Trigger::WebApp));
    assert_eq!(transport.sent_count(), 0);
}
