//! Operator command dispatch
//!
//! [`CommandDispatcher`] maps each operator intent to one pull call, checks
//! the intent's precondition against the mirrored status first, and turns
//! the result into store updates plus a notification.
//!
//! | Intent | Precondition | On success |
//! |---|---|---|
//! | start | not running-and-unpaused | notification |
//! | pause | running | notification |
//! | stop | running | notification |
//! | save configuration | none | store takes the saved copy |
//! | capture position | non-empty name | waypoint appended |
//! | delete waypoint | waypoint present locally | waypoint removed |
//!
//! Failures never escape: they are logged and posted as error
//! notifications. An intent whose precondition does not hold makes no call.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;

use crate::api::{ActionReply, ApiClient, BotCommand, Position};
use crate::error::ConsoleError;
use crate::notify::NotificationQueue;
use crate::store::StateStore;
use crate::transport::PullTransport;
use crate::types::config::NewWaypoint;
use crate::types::identifiers::WaypointId;

/// Result of one dispatched intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Call made and succeeded
    Completed,
    /// Precondition not met; no call made
    Declined,
    /// Call made and failed (error notification posted)
    Failed,
    /// Operator input missing; flow abandoned silently
    Aborted,
}

/// Translates operator intents into remote calls
pub struct CommandDispatcher<T> {
    api: Arc<ApiClient<T>>,
    store: StateStore,
    notifications: NotificationQueue,
}

impl<T: PullTransport> CommandDispatcher<T> {
    /// Create a dispatcher over shared store and notification handles
    pub fn new(api: Arc<ApiClient<T>>, store: StateStore, notifications: NotificationQueue) -> Self {
        Self {
            api,
            store,
            notifications,
        }
    }

    fn fail(&self, action: &str, error: &ConsoleError) -> CommandOutcome {
        log::error!("Failed to {action}: {error}");
        let message = match error.detail() {
            Some(detail) => format!("Failed to {action}: {detail}"),
            None => format!("Failed to {action}"),
        };
        self.notifications.error(message);
        CommandOutcome::Failed
    }

    fn acknowledge(&self, reply: ActionReply, fallback: &str) -> CommandOutcome {
        self.notifications
            .success(reply.message.unwrap_or_else(|| fallback.to_string()));
        CommandOutcome::Completed
    }

    /// Start the agent
    pub async fn start(&self) -> CommandOutcome {
        if !self.store.status().can_start() {
            log::debug!("Start ignored: agent already running");
            return CommandOutcome::Declined;
        }
        match self.api.start().await {
            Ok(reply) => self.acknowledge(reply, "Bot started"),
            Err(e) => self.fail("start bot", &e),
        }
    }

    /// Pause or resume the running agent
    pub async fn pause(&self) -> CommandOutcome {
        let status = self.store.status();
        if !status.can_pause() {
            log::debug!("Pause ignored: agent not running");
            return CommandOutcome::Declined;
        }
        match self.api.pause().await {
            Ok(reply) => {
                let paused = reply.is_paused.unwrap_or(!status.is_paused);
                let fallback = if paused { "Bot paused" } else { "Bot resumed" };
                self.acknowledge(reply, fallback)
            }
            Err(e) => self.fail("pause bot", &e),
        }
    }

    /// Stop the running agent
    pub async fn stop(&self) -> CommandOutcome {
        if !self.store.status().can_stop() {
            log::debug!("Stop ignored: agent not running");
            return CommandOutcome::Declined;
        }
        match self.api.stop().await {
            Ok(reply) => self.acknowledge(reply, "Bot stopped"),
            Err(e) => self.fail("stop bot", &e),
        }
    }

    /// Send the full local configuration to the server
    ///
    /// On success the store adopts the saved copy (with its server id) unless
    /// the operator edited it again while the save was in flight. On failure
    /// the local edits stay in place and remain marked unsaved; they are not
    /// rolled back.
    pub async fn save_configuration(&self) -> CommandOutcome {
        let (configuration, revision) = self.store.configuration_with_revision();
        match self.api.save_configuration(&configuration).await {
            Ok(receipt) => {
                let mut saved = configuration;
                if receipt.config_id.is_some() {
                    saved.id = receipt.config_id;
                }
                if !self.store.replace_configuration_if_unchanged(saved, revision) {
                    log::debug!("Configuration edited during save; keeping local copy");
                }
                self.notifications.success(
                    receipt
                        .message
                        .unwrap_or_else(|| "Configuration saved".to_string()),
                );
                CommandOutcome::Completed
            }
            Err(e) => self.fail("save configuration", &e),
        }
    }

    /// Capture the player's position as a new waypoint
    ///
    /// `prompt` is asked for a name once the position is known; returning
    /// `None` or a blank name abandons the flow without a notification.
    pub async fn capture_position<F, Fut>(&self, prompt: F) -> CommandOutcome
    where
        F: FnOnce(Position) -> Fut,
        Fut: Future<Output = Option<String>>,
    {
        let position = match self.api.current_position().await {
            Ok(position) => position,
            Err(e) => return self.fail("capture position", &e),
        };

        let Some(name) = prompt(position)
            .await
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
        else {
            log::debug!("Waypoint capture cancelled");
            return CommandOutcome::Aborted;
        };

        let waypoint = NewWaypoint {
            name,
            x: position.x,
            y: position.y,
            description: format!("Captured at {}", Utc::now().format("%Y-%m-%d %H:%M:%S")),
        };

        match self.api.create_waypoint(&waypoint).await {
            Ok(id) => {
                let id = id.unwrap_or_else(|| {
                    log::warn!("Server returned no waypoint id; using a provisional one");
                    WaypointId::provisional()
                });
                let message = format!(
                    "Waypoint \"{}\" added at ({}, {})",
                    waypoint.name, waypoint.x, waypoint.y
                );
                self.store.apply_waypoint_added(waypoint.with_id(id));
                self.notifications.success(message);
                CommandOutcome::Completed
            }
            Err(e) => self.fail("capture position", &e),
        }
    }

    /// Delete a waypoint from the route
    pub async fn delete_waypoint(&self, id: &WaypointId) -> CommandOutcome {
        if self.store.configuration().waypoint_index(id).is_none() {
            log::debug!("Delete ignored: no local waypoint {id}");
            return CommandOutcome::Declined;
        }
        match self.api.delete_waypoint(id).await {
            Ok(()) => {
                self.store.apply_waypoint_removed(id);
                self.notifications.success("Waypoint removed");
                CommandOutcome::Completed
            }
            Err(e) => self.fail("remove waypoint", &e),
        }
    }

    /// Halt the agent immediately, whatever its state
    pub async fn emergency_stop(&self) -> CommandOutcome {
        match self.api.command(BotCommand::EmergencyStop).await {
            Ok(reply) => self.acknowledge(reply, "Emergency stop executed"),
            Err(e) => self.fail("execute emergency stop", &e),
        }
    }

    /// Zero the counters of the current session
    pub async fn reset_stats(&self) -> CommandOutcome {
        match self.api.command(BotCommand::ResetStats).await {
            Ok(reply) => self.acknowledge(reply, "Statistics reset"),
            Err(e) => self.fail("reset statistics", &e),
        }
    }

    /// Re-pull the session history
    pub async fn refresh_sessions(&self) -> CommandOutcome {
        match self.api.fetch_sessions().await {
            Ok(sessions) => {
                self.store.replace_sessions(sessions);
                CommandOutcome::Completed
            }
            Err(e) => self.fail("load session history", &e),
        }
    }

    /// Re-pull the aggregate statistics report
    pub async fn refresh_statistics(&self) -> CommandOutcome {
        match self.api.fetch_statistics().await {
            Ok(statistics) => {
                self.store.set_statistics(statistics);
                CommandOutcome::Completed
            }
            Err(e) => self.fail("load statistics", &e),
        }
    }
}
