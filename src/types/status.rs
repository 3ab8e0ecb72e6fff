//! Live status snapshot types
//!
//! A [`StatusSnapshot`] is a complete, self-contained picture of the remote
//! agent at one instant. Snapshots replace each other wholesale; nothing in
//! this crate merges two snapshots field by field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identifiers::SessionId;

// ============================================================================
// Counters
// ============================================================================

/// Monotonic per-session counters
///
/// The agent publishes `{}` before the first session starts, so every
/// field defaults to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    /// Session these counters belong to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    /// Seconds elapsed since the session started
    pub time_running: u64,
    /// Heal spells cast
    pub heals_used: u64,
    /// Food items eaten
    pub food_used: u64,
    /// Attacks issued
    pub attacks_made: u64,
    /// Creatures killed
    pub creatures_killed: u64,
    /// Items picked up
    pub items_looted: u64,
    /// Items thrown away
    pub items_discarded: u64,
    /// Experience gained
    pub exp_gained: u64,
    /// Session start time
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "super::timestamp::optional"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

// ============================================================================
// In-game state
// ============================================================================

/// Character state as observed by the agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameState {
    /// Health in percent
    pub hp_percent: f64,
    /// Mana in percent
    pub mp_percent: f64,
    /// Whether the character is alive
    pub is_alive: bool,
    /// Name of the creature currently targeted
    pub target_creature: Option<String>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            hp_percent: 100.0,
            mp_percent: 100.0,
            is_alive: true,
            target_creature: None,
        }
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Coarse run state derived from the running/paused flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Agent not running
    Stopped,
    /// Agent running and acting
    Running,
    /// Agent running but paused
    Paused,
}

/// Remote agent status at one instant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusSnapshot {
    /// Whether the agent loop is running
    pub is_running: bool,
    /// Whether the running agent is paused
    pub is_paused: bool,
    /// Current session, if any
    pub session_id: Option<SessionId>,
    /// Session counters
    pub stats: Stats,
    /// Character state
    pub game_state: GameState,
}

impl StatusSnapshot {
    /// Derive the coarse run state
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        match (self.is_running, self.is_paused) {
            (false, _) => RunState::Stopped,
            (true, false) => RunState::Running,
            (true, true) => RunState::Paused,
        }
    }

    /// Start is offered unless the agent is running and not paused
    #[must_use]
    pub const fn can_start(&self) -> bool {
        !(self.is_running && !self.is_paused)
    }

    /// Pause/resume is offered only while running
    #[must_use]
    pub const fn can_pause(&self) -> bool {
        self.is_running
    }

    /// Stop is offered only while running
    #[must_use]
    pub const fn can_stop(&self) -> bool {
        self.is_running
    }

    /// Label for the pause toggle
    #[must_use]
    pub const fn pause_label(&self) -> &'static str {
        if self.is_paused { "Resume" } else { "Pause" }
    }
}
