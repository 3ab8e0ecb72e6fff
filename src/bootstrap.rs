//! One-shot initial state load
//!
//! [`BootstrapLoader::load`] pulls configuration, status and session history
//! concurrently. Each slice succeeds or fails on its own: a failure posts an
//! error notification and leaves that slice at its prior value.
//!
//! Pull calls are not cancellable. A slow status fetch that resolves after
//! a fresher push-channel snapshot still overwrites it; the next push
//! snapshot corrects the view.

use std::sync::Arc;

use crate::api::{ApiClient, ConfigFetch};
use crate::notify::NotificationQueue;
use crate::store::StateStore;
use crate::transport::PullTransport;

/// What happened to one slice of state during bootstrap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceOutcome {
    /// Fetched and applied
    Loaded,
    /// Fetched, but the server had nothing to apply
    Absent,
    /// Fetch failed; slice left unchanged
    Failed,
}

/// Per-slice result of [`BootstrapLoader::load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapReport {
    pub configuration: SliceOutcome,
    pub status: SliceOutcome,
    pub sessions: SliceOutcome,
}

impl BootstrapReport {
    /// Whether every slice was fetched without error
    #[must_use]
    pub fn is_complete(&self) -> bool {
        ![self.configuration, self.status, self.sessions].contains(&SliceOutcome::Failed)
    }
}

/// Initial snapshot loader
pub struct BootstrapLoader<T> {
    api: Arc<ApiClient<T>>,
    store: StateStore,
    notifications: NotificationQueue,
}

impl<T: PullTransport> BootstrapLoader<T> {
    /// Create a loader writing into `store`
    pub fn new(api: Arc<ApiClient<T>>, store: StateStore, notifications: NotificationQueue) -> Self {
        Self {
            api,
            store,
            notifications,
        }
    }

    /// Fetch all three slices concurrently and apply what arrives
    pub async fn load(&self) -> BootstrapReport {
        let (configuration, status, sessions) = tokio::join!(
            self.load_configuration(),
            self.load_status(),
            self.load_sessions()
        );
        let report = BootstrapReport {
            configuration,
            status,
            sessions,
        };
        log::info!("Bootstrap finished: {report:?}");
        report
    }

    async fn load_configuration(&self) -> SliceOutcome {
        match self.api.fetch_configuration().await {
            Ok(ConfigFetch::Found(configuration)) => {
                self.store.replace_configuration(*configuration);
                SliceOutcome::Loaded
            }
            Ok(ConfigFetch::NotFound) => {
                log::info!("No saved configuration; keeping defaults");
                SliceOutcome::Absent
            }
            Err(e) => {
                log::error!("Failed to load configuration: {e}");
                self.notifications.error("Failed to load configuration");
                SliceOutcome::Failed
            }
        }
    }

    async fn load_status(&self) -> SliceOutcome {
        match self.api.fetch_status().await {
            Ok(Some(snapshot)) => {
                self.store.apply_snapshot(snapshot);
                SliceOutcome::Loaded
            }
            Ok(None) => SliceOutcome::Absent,
            Err(e) => {
                log::error!("Failed to load status: {e}");
                self.notifications.error("Failed to load bot status");
                SliceOutcome::Failed
            }
        }
    }

    async fn load_sessions(&self) -> SliceOutcome {
        match self.api.fetch_sessions().await {
            Ok(sessions) => {
                self.store.replace_sessions(sessions);
                SliceOutcome::Loaded
            }
            Err(e) => {
                log::error!("Failed to load session history: {e}");
                self.notifications.error("Failed to load session history");
                SliceOutcome::Failed
            }
        }
    }
}
