//! Typed pull API of the remote agent
//!
//! [`ApiClient`] turns the raw JSON calls of a [`PullTransport`] into the
//! console's data model. It performs no state mutation and posts no
//! notifications; that is left to the dispatcher and bootstrap loader.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConsoleError, Result};
use crate::transport::{Method, PullTransport};
use crate::types::config::{Configuration, NewWaypoint};
use crate::types::identifiers::WaypointId;
use crate::types::session::{SessionRecord, Statistics};
use crate::types::status::StatusSnapshot;

// ============================================================================
// Routes
// ============================================================================

const CONFIG: &str = "/bot/config";
const STATUS: &str = "/bot/status";
const SESSIONS: &str = "/bot/sessions";
const STATISTICS: &str = "/bot/statistics";
const START: &str = "/bot/start";
const PAUSE: &str = "/bot/pause";
const STOP: &str = "/bot/stop";
const POSITION: &str = "/bot/current-position";
const WAYPOINT: &str = "/bot/waypoint";
const COMMAND: &str = "/bot/command";
const HEALTH: &str = "/health";

/// Characters escaped inside a single path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

// ============================================================================
// Response types
// ============================================================================

/// Result of fetching the saved configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigFetch {
    /// A configuration has been saved before
    Found(Box<Configuration>),
    /// Nothing saved yet; the server answered with its not-found marker
    NotFound,
}

/// Acknowledgement of a start/pause/stop/command call
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ActionReply {
    /// Human-readable outcome supplied by the server
    pub message: Option<String>,
    /// Paused flag after a pause toggle, when reported
    pub is_paused: Option<bool>,
}

/// Acknowledgement of a configuration save
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SaveReceipt {
    /// Human-readable outcome supplied by the server
    pub message: Option<String>,
    /// Id of the stored configuration document
    pub config_id: Option<String>,
}

/// Player position on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate
    pub x: i64,
    /// Y coordinate
    pub y: i64,
}

/// Ad-hoc bot command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BotCommand {
    /// Halt the agent immediately
    EmergencyStop,
    /// Zero the counters of the current session
    ResetStats,
}

#[derive(Debug, Deserialize)]
struct SessionsEnvelope {
    #[serde(default)]
    sessions: Vec<SessionRecord>,
}

/// Strip the `{ data: ... }` envelope if present
///
/// Returns `None` when the envelope is present but `data` is null.
fn unwrap_data(value: Value) -> Option<Value> {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").filter(|data| !data.is_null())
        }
        other => Some(other),
    }
}

fn decode<D: DeserializeOwned>(what: &str, value: Value) -> Result<D> {
    serde_json::from_value(value)
        .map_err(|e| ConsoleError::transport(format!("Unexpected {what} response: {e}")))
}

// ============================================================================
// Client
// ============================================================================

/// Typed client over a [`PullTransport`]
#[derive(Debug)]
pub struct ApiClient<T> {
    transport: T,
}

impl<T: PullTransport> ApiClient<T> {
    /// Wrap a transport
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Underlying transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch the most recently saved configuration
    ///
    /// # Errors
    /// Returns error if the call fails or the body is not a configuration
    pub async fn fetch_configuration(&self) -> Result<ConfigFetch> {
        let value = self.transport.request(Method::Get, CONFIG, None).await?;
        // The not-found marker is an object carrying `message` (and a
        // `default_config` that is deliberately ignored)
        if value.is_null() || value.get("message").is_some() {
            return Ok(ConfigFetch::NotFound);
        }
        Ok(ConfigFetch::Found(Box::new(decode("configuration", value)?)))
    }

    /// Save a full configuration
    ///
    /// # Errors
    /// Returns error if the call fails
    pub async fn save_configuration(&self, configuration: &Configuration) -> Result<SaveReceipt> {
        let body = serde_json::to_value(configuration)?;
        let value = self.transport.request(Method::Post, CONFIG, Some(body)).await?;
        if value.is_null() {
            return Ok(SaveReceipt::default());
        }
        decode("save", value)
    }

    /// Fetch the current status
    ///
    /// Returns `None` if the server answered without a snapshot.
    ///
    /// # Errors
    /// Returns error if the call fails or the snapshot is malformed
    pub async fn fetch_status(&self) -> Result<Option<StatusSnapshot>> {
        let value = self.transport.request(Method::Get, STATUS, None).await?;
        unwrap_data(value)
            .map(|data| decode("status", data))
            .transpose()
    }

    /// Fetch the session history, newest first
    ///
    /// # Errors
    /// Returns error if the call fails or a record is malformed
    pub async fn fetch_sessions(&self) -> Result<Vec<SessionRecord>> {
        let value = self.transport.request(Method::Get, SESSIONS, None).await?;
        if value.is_null() {
            return Ok(Vec::new());
        }
        let envelope: SessionsEnvelope = decode("sessions", value)?;
        Ok(envelope.sessions)
    }

    /// Fetch aggregate statistics
    ///
    /// # Errors
    /// Returns error if the call fails or the report is malformed
    pub async fn fetch_statistics(&self) -> Result<Statistics> {
        let value = self.transport.request(Method::Get, STATISTICS, None).await?;
        decode("statistics", value)
    }

    async fn action(&self, path: &str, body: Option<Value>) -> Result<ActionReply> {
        let value = self.transport.request(Method::Post, path, body).await?;
        if value.is_null() {
            return Ok(ActionReply::default());
        }
        decode("action", value)
    }

    /// Ask the agent to start
    ///
    /// # Errors
    /// Returns error if the call fails or is rejected
    pub async fn start(&self) -> Result<ActionReply> {
        self.action(START, None).await
    }

    /// Toggle pause on the running agent
    ///
    /// # Errors
    /// Returns error if the call fails or is rejected
    pub async fn pause(&self) -> Result<ActionReply> {
        self.action(PAUSE, None).await
    }

    /// Ask the agent to stop
    ///
    /// # Errors
    /// Returns error if the call fails or is rejected
    pub async fn stop(&self) -> Result<ActionReply> {
        self.action(STOP, None).await
    }

    /// Send an ad-hoc command
    ///
    /// # Errors
    /// Returns error if the call fails or the command is unknown to the server
    pub async fn command(&self, command: BotCommand) -> Result<ActionReply> {
        let body = serde_json::json!({ "command": command });
        self.action(COMMAND, Some(body)).await
    }

    /// Read the player's current position
    ///
    /// # Errors
    /// Returns error if the call fails or carries no coordinates
    pub async fn current_position(&self) -> Result<Position> {
        let value = self.transport.request(Method::Get, POSITION, None).await?;
        let data = unwrap_data(value)
            .ok_or_else(|| ConsoleError::transport("Position response carried no data"))?;
        decode("position", data)
    }

    /// Create a waypoint
    ///
    /// Returns the server-issued identifier, or `None` if the response did
    /// not carry one.
    ///
    /// # Errors
    /// Returns error if the call fails or is rejected
    pub async fn create_waypoint(&self, waypoint: &NewWaypoint) -> Result<Option<WaypointId>> {
        let body = serde_json::to_value(waypoint)?;
        let value = self.transport.request(Method::Post, WAYPOINT, Some(body)).await?;
        let id = value
            .get("waypoint")
            .unwrap_or(&value)
            .get("id")
            .cloned()
            .and_then(|id| serde_json::from_value::<WaypointId>(id).ok());
        Ok(id)
    }

    /// Delete a waypoint by identifier
    ///
    /// # Errors
    /// Returns error if the call fails or the server does not know the id
    pub async fn delete_waypoint(&self, id: &WaypointId) -> Result<()> {
        let segment = id.to_string();
        let path = format!("{WAYPOINT}/{}", utf8_percent_encode(&segment, PATH_SEGMENT));
        self.transport.request(Method::Delete, &path, None).await?;
        Ok(())
    }

    /// Check that the backend is up
    ///
    /// # Errors
    /// Returns error if the call fails
    pub async fn health(&self) -> Result<bool> {
        let value = self.transport.request(Method::Get, HEALTH, None).await?;
        Ok(value.get("status").and_then(Value::as_str) == Some("healthy"))
    }
}
