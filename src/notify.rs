//! Transient operator notifications
//!
//! [`NotificationQueue`] holds at most one visible [`Notification`]. Posting
//! replaces whatever is showing and restarts the expiry timer from the new
//! post time; the previous timer is cancelled.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::types::options::DEFAULT_NOTIFICATION_TTL;

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Neutral information
    Info,
    /// A command succeeded
    Success,
    /// A command or fetch failed
    Error,
}

/// One user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Message text
    pub message: String,
    /// Severity
    pub severity: Severity,
    /// When it was posted
    pub created_at: DateTime<Utc>,
}

struct Slot {
    /// Bumped on every post/clear so a stale timer never clears a newer message
    generation: u64,
    expiry: Option<JoinHandle<()>>,
}

struct QueueInner {
    current: watch::Sender<Option<Notification>>,
    slot: Mutex<Slot>,
    ttl: Duration,
}

/// Single-slot, self-expiring notification holder
#[derive(Clone)]
pub struct NotificationQueue {
    inner: Arc<QueueInner>,
}

impl NotificationQueue {
    /// Create a queue with the default five-second lifetime
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_NOTIFICATION_TTL)
    }

    /// Create a queue with a custom lifetime
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            inner: Arc::new(QueueInner {
                current,
                slot: Mutex::new(Slot {
                    generation: 0,
                    expiry: None,
                }),
                ttl,
            }),
        }
    }

    /// Show a message, replacing the current one
    ///
    /// Expiry is scheduled on the ambient tokio runtime; without one the
    /// message stays until replaced or cleared.
    pub fn post(&self, message: impl Into<String>, severity: Severity) {
        let notification = Notification {
            message: message.into(),
            severity,
            created_at: Utc::now(),
        };
        log::debug!("Notification ({severity:?}): {}", notification.message);

        let mut slot = self.inner.slot.lock();
        if let Some(previous) = slot.expiry.take() {
            previous.abort();
        }
        slot.generation += 1;
        let generation = slot.generation;
        self.inner.current.send_replace(Some(notification));

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let inner = Arc::clone(&self.inner);
                slot.expiry = Some(runtime.spawn(async move {
                    tokio::time::sleep(inner.ttl).await;
                    let mut slot = inner.slot.lock();
                    if slot.generation == generation {
                        slot.expiry = None;
                        inner.current.send_replace(None);
                    }
                }));
            }
            Err(_) => log::warn!("No tokio runtime; notification will not expire"),
        }
    }

    /// Post an info message
    pub fn info(&self, message: impl Into<String>) {
        self.post(message, Severity::Info);
    }

    /// Post a success message
    pub fn success(&self, message: impl Into<String>) {
        self.post(message, Severity::Success);
    }

    /// Post an error message
    pub fn error(&self, message: impl Into<String>) {
        self.post(message, Severity::Error);
    }

    /// Dismiss the current message and cancel its timer
    pub fn clear(&self) {
        let mut slot = self.inner.slot.lock();
        if let Some(expiry) = slot.expiry.take() {
            expiry.abort();
        }
        slot.generation += 1;
        self.inner.current.send_replace(None);
    }

    /// Currently visible message
    #[must_use]
    pub fn current(&self) -> Option<Notification> {
        self.inner.current.borrow().clone()
    }

    /// Watch the visible message
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.inner.current.subscribe()
    }

    /// Configured lifetime of a message
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NotificationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationQueue")
            .field("current", &self.current())
            .field("ttl", &self.inner.ttl)
            .finish()
    }
}
