//! In-memory mirror of remote status and configuration
//!
//! [`StateStore`] is the single owner of everything the console knows about
//! the remote agent. It is a cheap, cloneable handle: the connection
//! manager, dispatcher, bootstrap loader and presentation all share one
//! instance.
//!
//! # Mutation rules
//!
//! - `apply_snapshot` replaces the status wholesale (last write wins).
//! - `apply_config_edit` changes one configuration field locally and marks
//!   the configuration as having unsaved edits.
//! - Waypoint add/remove and `replace_configuration` reflect
//!   server-confirmed changes.
//!
//! Every mutation is serialized through one mutex and announced on a
//! broadcast channel as a [`StoreChange`].

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::types::config::{ConfigEdit, Configuration, Waypoint};
use crate::types::identifiers::WaypointId;
use crate::types::session::{SessionRecord, Statistics};
use crate::types::status::StatusSnapshot;

/// Capacity of the change broadcast; slow subscribers see `Lagged`
const CHANGE_CAPACITY: usize = 256;

/// Which slice of the mirror changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreChange {
    /// Status snapshot replaced
    Status,
    /// Configuration edited or replaced
    Configuration,
    /// Session history replaced
    Sessions,
    /// Statistics report replaced
    Statistics,
}

#[derive(Debug, Default)]
struct Mirror {
    status: StatusSnapshot,
    configuration: Configuration,
    sessions: Vec<SessionRecord>,
    statistics: Option<Statistics>,
    /// Bumped on every configuration mutation
    config_revision: u64,
    unsaved_edits: bool,
}

/// Shared handle to the console's state mirror
#[derive(Debug, Clone)]
pub struct StateStore {
    mirror: Arc<Mutex<Mirror>>,
    changes: broadcast::Sender<StoreChange>,
}

impl StateStore {
    /// Create a store holding default status and configuration
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            mirror: Arc::new(Mutex::new(Mirror::default())),
            changes,
        }
    }

    fn notify(&self, change: StoreChange) {
        // No subscribers is fine
        let _ = self.changes.send(change);
    }

    // ------------------------------------------------------------------
    // Read-only views
    // ------------------------------------------------------------------

    /// Current status snapshot
    #[must_use]
    pub fn status(&self) -> StatusSnapshot {
        self.mirror.lock().status.clone()
    }

    /// Current local configuration (including unsaved edits)
    #[must_use]
    pub fn configuration(&self) -> Configuration {
        self.mirror.lock().configuration.clone()
    }

    /// Session history
    #[must_use]
    pub fn sessions(&self) -> Vec<SessionRecord> {
        self.mirror.lock().sessions.clone()
    }

    /// Last statistics report, if one was fetched
    #[must_use]
    pub fn statistics(&self) -> Option<Statistics> {
        self.mirror.lock().statistics.clone()
    }

    /// Configuration together with its revision, read atomically
    #[must_use]
    pub fn configuration_with_revision(&self) -> (Configuration, u64) {
        let mirror = self.mirror.lock();
        (mirror.configuration.clone(), mirror.config_revision)
    }

    /// Whether local edits have not been confirmed by a save
    #[must_use]
    pub fn has_unsaved_edits(&self) -> bool {
        self.mirror.lock().unsaved_edits
    }

    /// Subscribe to change announcements
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    // ------------------------------------------------------------------
    // Mutation entry points
    // ------------------------------------------------------------------

    /// Replace the status snapshot unconditionally
    pub fn apply_snapshot(&self, snapshot: StatusSnapshot) {
        self.mirror.lock().status = snapshot;
        self.notify(StoreChange::Status);
    }

    /// Apply an operator edit to the local configuration copy
    pub fn apply_config_edit(&self, edit: ConfigEdit) {
        {
            let mut mirror = self.mirror.lock();
            mirror.configuration.apply(edit);
            mirror.config_revision += 1;
            mirror.unsaved_edits = true;
        }
        self.notify(StoreChange::Configuration);
    }

    /// Append a waypoint to the route
    ///
    /// Returns `false` (and leaves the route alone) if a waypoint with the
    /// same confirmed identifier is already present.
    pub fn apply_waypoint_added(&self, waypoint: Waypoint) -> bool {
        {
            let mut mirror = self.mirror.lock();
            if waypoint.id.is_confirmed()
                && mirror.configuration.waypoint_index(&waypoint.id).is_some()
            {
                log::warn!("Ignoring duplicate waypoint {}", waypoint.id);
                return false;
            }
            mirror.configuration.waypoints.push(waypoint);
            mirror.config_revision += 1;
        }
        self.notify(StoreChange::Configuration);
        true
    }

    /// Remove the waypoint with `id`, keeping the order of the others
    ///
    /// Returns the removed waypoint, or `None` if it was not present.
    pub fn apply_waypoint_removed(&self, id: &WaypointId) -> Option<Waypoint> {
        let removed = {
            let mut mirror = self.mirror.lock();
            let index = mirror.configuration.waypoint_index(id)?;
            mirror.config_revision += 1;
            mirror.configuration.waypoints.remove(index)
        };
        self.notify(StoreChange::Configuration);
        Some(removed)
    }

    /// Replace the whole configuration with a server-confirmed copy
    pub fn replace_configuration(&self, configuration: Configuration) {
        {
            let mut mirror = self.mirror.lock();
            mirror.configuration = configuration;
            mirror.config_revision += 1;
            mirror.unsaved_edits = false;
        }
        self.notify(StoreChange::Configuration);
    }

    /// Replace the configuration only if nothing changed since `revision`
    ///
    /// Returns whether the replacement happened.
    pub fn replace_configuration_if_unchanged(
        &self,
        configuration: Configuration,
        revision: u64,
    ) -> bool {
        {
            let mut mirror = self.mirror.lock();
            if mirror.config_revision != revision {
                return false;
            }
            mirror.configuration = configuration;
            mirror.config_revision += 1;
            mirror.unsaved_edits = false;
        }
        self.notify(StoreChange::Configuration);
        true
    }

    /// Replace the session history
    pub fn replace_sessions(&self, sessions: Vec<SessionRecord>) {
        self.mirror.lock().sessions = sessions;
        self.notify(StoreChange::Sessions);
    }

    /// Replace the statistics report
    pub fn set_statistics(&self, statistics: Statistics) {
        self.mirror.lock().statistics = Some(statistics);
        self.notify(StoreChange::Statistics);
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
