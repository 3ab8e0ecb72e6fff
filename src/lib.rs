//! # Bot Console
//!
//! Operator-side client for a remote game-automation agent. The console keeps
//! a local mirror of the agent's run state, configuration and session
//! history, and sends operator commands back to it.
//!
//! Two channels feed the mirror:
//!
//! - a **pull** API (request/response) for commands and one-shot fetches
//! - a **push** channel (persistent, server-initiated) for live status
//!
//! ## Quick Start
//!
//! ```no_run
//! use bot_console::{Console, ConsoleOptions, StoreChange};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ConsoleOptions::builder()
//!         .base_url("http://localhost:8001")
//!         .build();
//!     let console = Console::remote(options)?;
//!     console.start().await;
//!
//!     let mut changes = console.store().subscribe();
//!     while let Ok(change) = changes.recv().await {
//!         if change == StoreChange::Status {
//!             let status = console.store().status();
//!             log::info!("{:?} for {}s", status.run_state(), status.stats.time_running);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`store`]: the single local mirror of remote state
//! - [`connection`]: push channel lifecycle with fixed-delay reconnect
//! - [`bootstrap`]: concurrent initial load
//! - [`dispatcher`]: operator intents to pull calls
//! - [`notify`]: single-slot, self-expiring notifications
//! - [`api`]: typed pull API
//! - [`transport`]: pull and push transport traits and network impls
//! - [`message`]: push message parsing
//! - [`types`]: data model, identifiers and options
//! - [`error`]: error types
//!
//! ## Feature Flags
//!
//! - `http` (default) - Enables the `reqwest` pull transport and
//!   [`Console::remote`]

#![warn(clippy::all)]

pub mod api;
pub mod bootstrap;
pub mod connection;
pub mod console;
pub mod dispatcher;
pub mod error;
pub mod format;
pub mod message;
pub mod notify;
pub mod store;
pub mod transport;
pub mod types;

// Re-export commonly used types for external API
pub use api::{ApiClient, BotCommand, ConfigFetch, Position};
pub use bootstrap::{BootstrapLoader, BootstrapReport, SliceOutcome};
pub use connection::{ConnectionManager, ConnectionState};
pub use console::Console;
#[cfg(feature = "http")]
pub use console::RemoteConsole;
pub use dispatcher::{CommandDispatcher, CommandOutcome};
pub use error::{ConsoleError, Result};
pub use message::{PushMessage, parse_push_message};
pub use notify::{Notification, NotificationQueue, Severity};
pub use store::{StateStore, StoreChange};
pub use transport::{ChannelConnector, DuplexChannel, Method, PullTransport};

// Re-export type submodules for flat public API
pub use types::config::{ConfigEdit, Configuration, NewWaypoint, Waypoint, WaypointMode};
pub use types::identifiers::{SessionId, WaypointId};
pub use types::options::{ConsoleOptions, ConsoleOptionsBuilder};
pub use types::session::{HistoricalTotals, SessionRecord, Statistics};
pub use types::status::{GameState, RunState, StatusSnapshot, Stats};

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
