//! Integration tests for `CommandDispatcher`
//!
//! Tests preconditions, store updates and notifications against a scripted
//! pull transport

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::time::Duration;

use bot_console::{
    ApiClient, CommandDispatcher, CommandOutcome, ConfigEdit, Method, NotificationQueue, Severity,
    StateStore, Waypoint, WaypointId,
};
use common::{MockTransport, Reply};
use serde_json::json;

struct Harness {
    transport: MockTransport,
    store: StateStore,
    notifications: NotificationQueue,
    dispatcher: CommandDispatcher<MockTransport>,
}

fn harness() -> Harness {
    common::init_logging();
    let transport = MockTransport::new();
    let store = StateStore::new();
    let notifications = NotificationQueue::new();
    let dispatcher = CommandDispatcher::new(
        Arc::new(ApiClient::new(transport.clone())),
        store.clone(),
        notifications.clone(),
    );
    Harness {
        transport,
        store,
        notifications,
        dispatcher,
    }
}

impl Harness {
    fn notification(&self) -> Option<(Severity, String)> {
        self.notifications
            .current()
            .map(|n| (n.severity, n.message))
    }
}

#[tokio::test]
async fn test_start_is_noop_while_running() {
    let h = harness();
    h.store.apply_snapshot(common::snapshot(true, false));

    assert_eq!(h.dispatcher.start().await, CommandOutcome::Declined);
    assert_eq!(h.transport.count(Method::Post, "/bot/start"), 0);
    assert!(h.notifications.current().is_none());
}

#[tokio::test]
async fn test_start_from_stopped_makes_one_call() {
    let h = harness();
    h.transport.on(
        Method::Post,
        "/bot/start",
        Reply::Json(json!({"message": "Bot started successfully", "is_running": true})),
    );

    assert_eq!(h.dispatcher.start().await, CommandOutcome::Completed);
    assert_eq!(h.transport.count(Method::Post, "/bot/start"), 1);
    assert_eq!(
        h.notification(),
        Some((Severity::Success, "Bot started successfully".to_string()))
    );
}

#[tokio::test]
async fn test_start_allowed_while_paused() {
    let h = harness();
    h.store.apply_snapshot(common::snapshot(true, true));
    h.transport.on(Method::Post, "/bot/start", Reply::Json(json!({})));

    assert_eq!(h.dispatcher.start().await, CommandOutcome::Completed);
    assert_eq!(
        h.notification(),
        Some((Severity::Success, "Bot started".to_string()))
    );
}

#[tokio::test]
async fn test_start_failure_reports_detail() {
    let h = harness();
    h.transport.on(
        Method::Post,
        "/bot/start",
        Reply::Reject(400, Some("Bot is already running")),
    );

    assert_eq!(h.dispatcher.start().await, CommandOutcome::Failed);
    assert_eq!(
        h.notification(),
        Some((
            Severity::Error,
            "Failed to start bot: Bot is already running".to_string()
        ))
    );
}

#[tokio::test]
async fn test_pause_and_stop_require_running() {
    let h = harness();

    assert_eq!(h.dispatcher.pause().await, CommandOutcome::Declined);
    assert_eq!(h.dispatcher.stop().await, CommandOutcome::Declined);
    assert!(h.transport.calls().is_empty());

    h.store.apply_snapshot(common::snapshot(true, true));
    h.transport
        .on(Method::Post, "/bot/pause", Reply::Json(json!({"is_paused": false})))
        .on(Method::Post, "/bot/stop", Reply::Down);

    assert_eq!(h.dispatcher.pause().await, CommandOutcome::Completed);
    assert_eq!(
        h.notification(),
        Some((Severity::Success, "Bot resumed".to_string()))
    );

    assert_eq!(h.dispatcher.stop().await, CommandOutcome::Failed);
    assert_eq!(
        h.notification(),
        Some((Severity::Error, "Failed to stop bot".to_string()))
    );
}

#[tokio::test]
async fn test_capture_position_end_to_end() {
    let h = harness();
    h.transport
        .on(
            Method::Get,
            "/bot/current-position",
            Reply::Json(json!({"data": {"x": 100, "y": 200, "message": "Position captured"}})),
        )
        .on(
            Method::Post,
            "/bot/waypoint",
            Reply::Json(json!({
                "message": "Waypoint added successfully",
                "waypoint": {"id": "wp-1", "name": "Camp A", "x": 100, "y": 200}
            })),
        );

    let outcome = h
        .dispatcher
        .capture_position(|position| async move {
            assert_eq!((position.x, position.y), (100, 200));
            Some("Camp A".to_string())
        })
        .await;
    assert_eq!(outcome, CommandOutcome::Completed);

    let body = h
        .transport
        .last_body(Method::Post, "/bot/waypoint")
        .expect("waypoint body sent");
    assert_eq!(body["name"], "Camp A");
    assert_eq!(body["x"], 100);
    assert_eq!(body["y"], 200);
    assert!(body["description"].as_str().is_some_and(|d| d.starts_with("Captured at ")));

    let waypoints = h.store.configuration().waypoints;
    assert_eq!(waypoints.len(), 1);
    let last = waypoints.last().expect("waypoint appended");
    assert_eq!(last.id, WaypointId::confirmed("wp-1"));
    assert_eq!(last.name, "Camp A");
    assert_eq!((last.x, last.y), (100, 200));

    assert_eq!(
        h.notification(),
        Some((
            Severity::Success,
            "Waypoint \"Camp A\" added at (100, 200)".to_string()
        ))
    );
}

#[tokio::test]
async fn test_capture_without_server_id_uses_provisional() {
    let h = harness();
    h.transport
        .on(
            Method::Get,
            "/bot/current-position",
            Reply::Json(json!({"data": {"x": -5, "y": 7}})),
        )
        .on(Method::Post, "/bot/waypoint", Reply::Json(json!({"message": "ok"})));

    let outcome = h
        .dispatcher
        .capture_position(|_| async { Some("Ramp".to_string()) })
        .await;
    assert_eq!(outcome, CommandOutcome::Completed);

    let waypoints = h.store.configuration().waypoints;
    assert_eq!(waypoints.len(), 1);
    assert!(!waypoints[0].id.is_confirmed());
}

#[tokio::test]
async fn test_capture_with_empty_name_aborts_silently() {
    let h = harness();
    h.transport.on(
        Method::Get,
        "/bot/current-position",
        Reply::Json(json!({"data": {"x": 1, "y": 2}})),
    );

    let outcome = h
        .dispatcher
        .capture_position(|_| async { Some("   ".to_string()) })
        .await;
    assert_eq!(outcome, CommandOutcome::Aborted);

    let outcome = h.dispatcher.capture_position(|_| async { None }).await;
    assert_eq!(outcome, CommandOutcome::Aborted);

    assert_eq!(h.transport.count(Method::Post, "/bot/waypoint"), 0);
    assert!(h.store.configuration().waypoints.is_empty());
    assert!(h.notifications.current().is_none());
}

#[tokio::test]
async fn test_capture_position_failure() {
    let h = harness();

    let outcome = h
        .dispatcher
        .capture_position(|_| async { panic!("prompt must not run without a position") })
        .await;
    assert_eq!(outcome, CommandOutcome::Failed);
    assert_eq!(h.notification().map(|(s, _)| s), Some(Severity::Error));
}

#[tokio::test]
async fn test_delete_waypoint() {
    let h = harness();
    for (id, name) in [("a", "Depot"), ("b", "Cave"), ("c", "Temple")] {
        h.store.apply_waypoint_added(Waypoint {
            id: WaypointId::confirmed(id),
            name: name.to_string(),
            x: 0,
            y: 0,
            description: None,
        });
    }
    h.transport
        .on(Method::Delete, "/bot/waypoint/b", Reply::Json(json!({"message": "Waypoint removed successfully"})))
        .on(Method::Delete, "/bot/waypoint/c", Reply::Reject(404, Some("Waypoint not found")));

    let missing = WaypointId::confirmed("zzz");
    assert_eq!(h.dispatcher.delete_waypoint(&missing).await, CommandOutcome::Declined);
    assert!(h.transport.calls().is_empty());

    let outcome = h.dispatcher.delete_waypoint(&WaypointId::confirmed("b")).await;
    assert_eq!(outcome, CommandOutcome::Completed);
    let names: Vec<_> = h
        .store
        .configuration()
        .waypoints
        .into_iter()
        .map(|w| w.name)
        .collect();
    assert_eq!(names, vec!["Depot", "Temple"]);

    // A failed delete leaves the route untouched
    let outcome = h.dispatcher.delete_waypoint(&WaypointId::confirmed("c")).await;
    assert_eq!(outcome, CommandOutcome::Failed);
    assert_eq!(h.store.configuration().waypoints.len(), 2);
}

#[tokio::test]
async fn test_save_configuration_adopts_server_id() {
    let h = harness();
    h.store.apply_config_edit(ConfigEdit::HealAtHp(40));
    h.transport.on(
        Method::Post,
        "/bot/config",
        Reply::Json(json!({"message": "Configuration saved successfully", "config_id": "cfg-9"})),
    );

    assert_eq!(h.dispatcher.save_configuration().await, CommandOutcome::Completed);

    let body = h
        .transport
        .last_body(Method::Post, "/bot/config")
        .expect("configuration body sent");
    assert_eq!(body["heal_at_hp"], 40);
    assert_eq!(body["waypoint_mode"], "loop");

    let configuration = h.store.configuration();
    assert_eq!(configuration.id.as_deref(), Some("cfg-9"));
    assert_eq!(configuration.heal_at_hp, 40);
    assert!(!h.store.has_unsaved_edits());
    assert_eq!(
        h.notification(),
        Some((Severity::Success, "Configuration saved successfully".to_string()))
    );
}

#[tokio::test]
async fn test_failed_save_keeps_edits() {
    let h = harness();
    h.store.apply_config_edit(ConfigEdit::AttackSpell("exori gran".to_string()));
    h.transport.on(Method::Post, "/bot/config", Reply::Reject(500, None));

    assert_eq!(h.dispatcher.save_configuration().await, CommandOutcome::Failed);
    assert_eq!(h.store.configuration().attack_spell, "exori gran");
    assert!(h.store.has_unsaved_edits());
    assert_eq!(
        h.notification(),
        Some((Severity::Error, "Failed to save configuration".to_string()))
    );
}

#[tokio::test(start_paused = true)]
async fn test_edit_during_save_is_not_overwritten() {
    let h = harness();
    h.transport
        .on(Method::Post, "/bot/config", Reply::Json(json!({"config_id": "cfg-1"})))
        .delay(Method::Post, "/bot/config", Duration::from_secs(1));

    let save = h.dispatcher.save_configuration();
    let edit = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        h.store.apply_config_edit(ConfigEdit::FoodAt(20));
    };
    let (outcome, ()) = tokio::join!(save, edit);

    assert_eq!(outcome, CommandOutcome::Completed);
    assert_eq!(h.store.configuration().food_at, 20);
    assert!(h.store.has_unsaved_edits());
}

#[tokio::test]
async fn test_ad_hoc_commands() {
    let h = harness();
    h.transport.on(
        Method::Post,
        "/bot/command",
        Reply::Json(json!({"message": "Emergency stop executed"})),
    );

    assert_eq!(h.dispatcher.emergency_stop().await, CommandOutcome::Completed);
    assert_eq!(
        h.transport.last_body(Method::Post, "/bot/command"),
        Some(json!({"command": "emergency_stop"}))
    );

    assert_eq!(h.dispatcher.reset_stats().await, CommandOutcome::Completed);
    assert_eq!(
        h.transport.last_body(Method::Post, "/bot/command"),
        Some(json!({"command": "reset_stats"}))
    );
}

#[tokio::test]
async fn test_refresh_sessions_and_statistics() {
    let h = harness();
    h.transport
        .on(
            Method::Get,
            "/bot/sessions",
            Reply::Json(json!({
                "sessions": [
                    {"session_id": "s2", "time_running": 60, "exp_gained": 10, "created_at": "2024-05-02T09:00:00"},
                    {"session_id": "s1", "time_running": 30, "ended_at": "2024-05-01T10:30:00"}
                ],
                "total": 2
            })),
        )
        .on(
            Method::Get,
            "/bot/statistics",
            Reply::Json(json!({
                "current_session": {},
                "historical": {"total_sessions": 2, "total_time": 90, "total_creatures": 5,
                               "total_items": 3, "total_heals": 1, "total_attacks": 9}
            })),
        );

    assert_eq!(h.dispatcher.refresh_sessions().await, CommandOutcome::Completed);
    let sessions = h.store.sessions();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].exp_gained(), 10);
    assert!(sessions[1].ended_at.is_some());

    assert_eq!(h.dispatcher.refresh_statistics().await, CommandOutcome::Completed);
    let statistics = h.store.statistics().expect("statistics stored");
    assert_eq!(statistics.historical.total_sessions, 2);
    assert_eq!(statistics.historical.total_time, 90);
}

#[tokio::test]
async fn test_pause_notification_follows_reported_flag() {
    let h = harness();
    h.store.apply_snapshot(common::snapshot(true, false));
    h.transport
        .on(Method::Post, "/bot/pause", Reply::Json(json!({"is_paused": false})));

    // The reported flag wins over the local state
    assert_eq!(h.dispatcher.pause().await, CommandOutcome::Completed);
    assert_eq!(
        h.notification(),
        Some((Severity::Success, "Bot resumed".to_string()))
    );

    h.transport.on(Method::Post, "/bot/pause", Reply::Json(json!({})));
    assert_eq!(h.dispatcher.pause().await, CommandOutcome::Completed);
    assert_eq!(
        h.notification(),
        Some((Severity::Success, "Bot paused".to_string()))
    );
}

#[tokio::test]
async fn test_delete_waypoint_escapes_identifier() {
    let h = harness();
    h.store.apply_waypoint_added(Waypoint {
        id: WaypointId::confirmed("north gate/2?"),
        name: "Gate".to_string(),
        x: 0,
        y: 0,
        description: None,
    });
    h.transport.on(
        Method::Delete,
        "/bot/waypoint/north%20gate%2F2%3F",
        Reply::Json(json!({"message": "Waypoint removed successfully"})),
    );

    let outcome = h
        .dispatcher
        .delete_waypoint(&WaypointId::confirmed("north gate/2?"))
        .await;
    assert_eq!(outcome, CommandOutcome::Completed);
    assert_eq!(h.transport.count(Method::Delete, "/bot/waypoint/north%20gate%2F2%3F"), 1);
    assert!(h.store.configuration().waypoints.is_empty());
}
