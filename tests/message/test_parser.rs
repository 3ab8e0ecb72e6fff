//! Unit tests for the push message parser
//!
//! Tests decoding of push-channel text frames into typed messages

use bot_console::{ConsoleError, PushMessage, RunState, parse_push_message};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

#[test]
fn test_parse_stats_update() {
    let frame = json!({
        "type": "stats_update",
        "data": {
            "is_running": true,
            "is_paused": false,
            "session_id": "abc",
            "stats": {"time_running": 125, "creatures_killed": 4},
            "game_state": {"hp_percent": 55.5, "mp_percent": 20, "is_alive": true, "target_creature": null}
        }
    })
    .to_string();

    let message = assert_ok!(parse_push_message(&frame));
    let PushMessage::StatsUpdate(snapshot) = message else {
        panic!("expected stats_update, got {message:?}");
    };
    assert_eq!(snapshot.run_state(), RunState::Running);
    assert_eq!(snapshot.stats.time_running, 125);
    assert_eq!(snapshot.stats.creatures_killed, 4);
    assert_eq!(snapshot.stats.heals_used, 0);
    assert!((snapshot.game_state.hp_percent - 55.5).abs() < f64::EPSILON);
    assert_eq!(snapshot.session_id.as_ref().map(|id| id.as_str()), Some("abc"));
}

#[test]
fn test_parse_stats_update_with_flat_counters() {
    let frame = json!({
        "type": "stats_update",
        "data": {
            "session_id": "s",
            "time_running": 42,
            "creatures_killed": 5,
            "exp_gained": 1200,
            "is_running": true,
            "is_paused": false,
            "game_state": {"hp_percent": 80, "mp_percent": 40, "is_alive": true, "target_creature": "Rat"}
        }
    })
    .to_string();

    let snapshot = assert_ok!(parse_push_message(&frame))
        .into_snapshot()
        .expect("stats_update carries a snapshot");
    assert_eq!(snapshot.run_state(), RunState::Running);
    assert_eq!(snapshot.stats.time_running, 42);
    assert_eq!(snapshot.stats.creatures_killed, 5);
    assert_eq!(snapshot.stats.exp_gained, 1200);
    assert_eq!(snapshot.stats.session_id.as_ref().map(|id| id.as_str()), Some("s"));
    assert_eq!(snapshot.session_id.as_ref().map(|id| id.as_str()), Some("s"));
    assert_eq!(snapshot.game_state.target_creature.as_deref(), Some("Rat"));
}

#[test]
fn test_parse_status_update_applies_like_stats_update() {
    let frame = json!({
        "type": "status_update",
        "data": {"is_running": true, "is_paused": true, "stats": {}}
    })
    .to_string();

    let snapshot = assert_ok!(parse_push_message(&frame))
        .into_snapshot()
        .expect("status_update carries a snapshot");
    assert_eq!(snapshot.run_state(), RunState::Paused);
    assert_eq!(snapshot.stats.time_running, 0);
}

#[test]
fn test_parse_pong() {
    let message = assert_ok!(parse_push_message(r#"{"type":"pong"}"#));
    assert_eq!(message, PushMessage::Pong);
    assert!(message.into_snapshot().is_none());
}

#[test]
fn test_unknown_tag_is_not_an_error() {
    let message = assert_ok!(parse_push_message(r#"{"type":"loot_event","data":{"item":"gold"}}"#));
    assert_eq!(message, PushMessage::Unknown("loot_event".to_string()));
}

#[test]
fn test_parse_malformed_json() {
    let err = assert_err!(parse_push_message("{not json"));
    assert!(matches!(err, ConsoleError::JsonDecode(_)));
}

#[test]
fn test_parse_missing_type() {
    let err = assert_err!(parse_push_message(r#"{"data":{}}"#));
    assert!(matches!(err, ConsoleError::MessageParse { .. }));
}

#[test]
fn test_parse_snapshot_without_data() {
    let err = assert_err!(parse_push_message(r#"{"type":"stats_update"}"#));
    assert!(matches!(err, ConsoleError::MessageParse { .. }));

    let err = assert_err!(parse_push_message(r#"{"type":"stats_update","data":null}"#));
    assert!(matches!(err, ConsoleError::MessageParse { .. }));
}

#[test]
fn test_parse_snapshot_with_wrong_field_type() {
    let err = assert_err!(parse_push_message(
        r#"{"type":"stats_update","data":{"is_running":"yes"}}"#
    ));
    assert!(matches!(err, ConsoleError::MessageParse { data: Some(_), .. }));
}
