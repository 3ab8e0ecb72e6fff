//! Newtype wrappers for type safety
//!
//! This module contains newtype wrappers that provide type safety by wrapping
//! primitive identifiers handed out by the remote agent.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Newtype Wrappers for Type Safety
// ============================================================================

/// Bot session ID newtype for type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new session ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the session ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Waypoint identifier
///
/// Server-issued identifiers are strings. A provisional identifier is a
/// millisecond timestamp minted locally when the create call did not echo
/// an identifier back; it serializes as a number, which is also how
/// provisional entries saved by older consoles come back from the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WaypointId {
    /// Identifier assigned by the server
    Confirmed(String),
    /// Locally minted placeholder
    Provisional(u64),
}

impl WaypointId {
    /// Create a confirmed identifier
    pub fn confirmed(id: impl Into<String>) -> Self {
        Self::Confirmed(id.into())
    }

    /// Mint a provisional identifier from the current wall-clock time
    #[must_use]
    pub fn provisional() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        Self::Provisional(u64::try_from(millis).unwrap_or_default())
    }

    /// Whether this identifier was issued by the server
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }
}

impl fmt::Display for WaypointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmed(id) => f.write_str(id),
            Self::Provisional(millis) => write!(f, "{millis}"),
        }
    }
}

impl From<String> for WaypointId {
    fn from(s: String) -> Self {
        Self::Confirmed(s)
    }
}

impl From<&str> for WaypointId {
    fn from(s: &str) -> Self {
        Self::Confirmed(s.to_string())
    }
}
