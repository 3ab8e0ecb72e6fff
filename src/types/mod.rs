//! Type definitions for the bot console
//!
//! This module contains the data model mirrored from the remote agent,
//! organized into logical submodules:
//!
//! - [`identifiers`] - Type-safe ID wrappers (`SessionId`, `WaypointId`)
//! - [`status`] - Live status snapshots (`StatusSnapshot`, `Stats`, `GameState`)
//! - [`config`] - Operator-editable configuration, waypoints and edits
//! - [`session`] - Session history and aggregate statistics
//! - [`options`] - Console connection and timing options
//! - [`timestamp`] - Lenient timestamp parsing

pub mod config;
pub mod identifiers;
pub mod options;
pub mod session;
pub mod status;
pub mod timestamp;

// Re-export commonly used types
pub use config::{ConfigEdit, Configuration, NewWaypoint, Waypoint, WaypointMode};
pub use identifiers::{SessionId, WaypointId};
pub use options::{ConsoleOptions, ConsoleOptionsBuilder};
pub use session::{HistoricalTotals, SessionRecord, Statistics};
pub use status::{GameState, RunState, StatusSnapshot, Stats};
