//! Historical session types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::Stats;

/// Summary of a finished bot session
///
/// Records are immutable once received; the history is only ever replaced
/// as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Counters at the time the session ended (includes `created_at`)
    #[serde(flatten)]
    pub stats: Stats,
    /// When the session was stopped
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "super::timestamp::optional"
    )]
    pub ended_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    /// Session start time
    #[must_use]
    pub const fn created_at(&self) -> Option<DateTime<Utc>> {
        self.stats.created_at
    }

    /// Experience gained during the session
    #[must_use]
    pub const fn exp_gained(&self) -> u64 {
        self.stats.exp_gained
    }
}

/// Totals across every recorded session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalTotals {
    pub total_sessions: u64,
    /// Seconds
    pub total_time: u64,
    pub total_creatures: u64,
    pub total_items: u64,
    pub total_heals: u64,
    pub total_attacks: u64,
}

/// Server-side statistics report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statistics {
    /// Counters of the session in progress, if any
    pub current_session: Option<Stats>,
    /// Aggregates over stored sessions
    pub historical: HistoricalTotals,
}
