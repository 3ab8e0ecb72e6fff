//! Unit tests for `NotificationQueue`
//!
//! Tests single-slot replacement and timed expiry under paused time

use std::time::Duration;

use bot_console::{NotificationQueue, Severity};
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn test_notification_expires_after_ttl() {
    let queue = NotificationQueue::new();
    queue.success("Bot started");

    sleep(Duration::from_millis(4900)).await;
    assert_eq!(queue.current().map(|n| n.message), Some("Bot started".to_string()));

    sleep(Duration::from_millis(200)).await;
    assert!(queue.current().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_second_post_replaces_and_restarts_timer() {
    let queue = NotificationQueue::new();
    queue.info("first");

    sleep(Duration::from_secs(2)).await;
    queue.error("second");

    let current = queue.current().expect("second is showing");
    assert_eq!(current.message, "second");
    assert_eq!(current.severity, Severity::Error);

    // The first post's timer would fire here; it must not clear "second"
    sleep(Duration::from_millis(3500)).await;
    assert_eq!(queue.current().map(|n| n.message), Some("second".to_string()));

    // Five seconds after the second post
    sleep(Duration::from_secs(2)).await;
    assert!(queue.current().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_clear_dismisses_immediately() {
    let queue = NotificationQueue::with_ttl(Duration::from_secs(1));
    let mut watcher = queue.subscribe();

    queue.success("saved");
    watcher.changed().await.expect("queue alive");
    assert!(watcher.borrow_and_update().is_some());

    queue.clear();
    watcher.changed().await.expect("queue alive");
    assert!(watcher.borrow_and_update().is_none());

    sleep(Duration::from_secs(2)).await;
    assert!(queue.current().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_clones_share_the_slot() {
    let queue = NotificationQueue::new();
    let handle = queue.clone();
    handle.error("from a clone");
    assert_eq!(queue.current().map(|n| n.severity), Some(Severity::Error));
}
