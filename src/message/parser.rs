//! Message parser for push-channel frames

use serde::Serialize;

use crate::error::{ConsoleError, Result};
use crate::types::status::StatusSnapshot;

/// Decoded inbound push message
#[derive(Debug, Clone, PartialEq)]
pub enum PushMessage {
    /// Periodic telemetry broadcast (`stats_update`)
    StatsUpdate(StatusSnapshot),
    /// Reply to a `get_status` request (`status_update`)
    StatusUpdate(StatusSnapshot),
    /// Reply to a `ping`
    Pong,
    /// Any other tag; carries the tag for logging
    Unknown(String),
}

impl PushMessage {
    /// The snapshot carried by this message, if any
    #[must_use]
    pub fn into_snapshot(self) -> Option<StatusSnapshot> {
        match self {
            Self::StatsUpdate(snapshot) | Self::StatusUpdate(snapshot) => Some(snapshot),
            Self::Pong | Self::Unknown(_) => None,
        }
    }
}

/// Outbound push-channel request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChannelRequest {
    /// Liveness check, answered with `pong`
    Ping,
    /// Ask for an immediate `status_update`
    GetStatus,
}

impl ChannelRequest {
    /// Encode as a text frame
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_frame(self) -> Result<String> {
        Ok(serde_json::to_string(&self)?)
    }
}

/// Nest flat counters under `stats`
///
/// Some agents broadcast the counters at the top level of `data` next to
/// the run flags. Without a `stats` object the whole payload is read as the
/// counters, so they are not silently zeroed.
fn with_nested_stats(mut data: serde_json::Value) -> serde_json::Value {
    if let serde_json::Value::Object(map) = &mut data {
        if !map.contains_key("stats") {
            let counters = serde_json::Value::Object(map.clone());
            map.insert("stats".to_string(), counters);
        }
    }
    data
}

/// Parse a text frame into a typed [`PushMessage`]
///
/// Frames use the envelope `{ "type": string, "data": object }`. Unknown
/// tags decode to [`PushMessage::Unknown`] rather than failing.
///
/// # Errors
/// Returns `ConsoleError::JsonDecode` for malformed JSON and
/// `ConsoleError::MessageParse` for an envelope without a string `type`, or
/// a snapshot tag whose `data` is missing or malformed
pub fn parse_push_message(frame: &str) -> Result<PushMessage> {
    let mut value: serde_json::Value = serde_json::from_str(frame)?;

    let Some(tag) = value.get("type").and_then(|t| t.as_str()).map(String::from) else {
        return Err(ConsoleError::message_parse("Envelope has no type tag", Some(value)));
    };

    let snapshot = |value: &mut serde_json::Value| -> Result<StatusSnapshot> {
        let data = value
            .get_mut("data")
            .map(serde_json::Value::take)
            .filter(|d| !d.is_null())
            .ok_or_else(|| {
                ConsoleError::message_parse(format!("{tag} without data"), Some(value.clone()))
            })?;
        let data = with_nested_stats(data);
        serde_json::from_value(data.clone()).map_err(|e| {
            ConsoleError::message_parse(format!("Failed to parse {tag} payload: {e}"), Some(data))
        })
    };

    match tag.as_str() {
        "stats_update" => Ok(PushMessage::StatsUpdate(snapshot(&mut value)?)),
        "status_update" => Ok(PushMessage::StatusUpdate(snapshot(&mut value)?)),
        "pong" => Ok(PushMessage::Pong),
        _ => Ok(PushMessage::Unknown(tag)),
    }
}
