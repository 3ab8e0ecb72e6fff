//! Push-channel connection management
//!
//! [`ConnectionManager`] owns at most one live push channel and keeps it
//! alive: whenever the channel closes or errors it waits a fixed delay and
//! dials again, forever, until [`ConnectionManager::disconnect`] is called.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    ConnectionManager                     │
//! │                                                          │
//! │  connect() ──spawns──► channel task (one at a time)      │
//! │                         │                                │
//! │                         ├─ open ─► pump ─► close/error   │
//! │                         │             │                  │
//! │                         │             └─► StateStore     │
//! │                         │                 apply_snapshot │
//! │                         └─ sleep(delay) ◄─ cancellable   │
//! │                                                          │
//! │  disconnect() ── cancels token, awaits task, Closed      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Channel failures never surface as errors or notifications; they show up
//! only as [`ConnectionState`] transitions.

mod task;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::message::ChannelRequest;
use crate::store::StateStore;
use crate::transport::ChannelConnector;
use crate::types::options::DEFAULT_RECONNECT_DELAY;

/// How long `disconnect` waits for the channel task to close gracefully
const TEARDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Capacity of the transition broadcast
const TRANSITION_CAPACITY: usize = 64;

/// Lifecycle state of the push channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No channel
    Closed,
    /// Dialing
    Connecting,
    /// Channel open and delivering messages
    Open,
    /// Waiting for the reconnect timer
    Reconnecting,
}

/// Publishes the current state and every transition
pub(crate) struct StateCell {
    current: watch::Sender<ConnectionState>,
    transitions: broadcast::Sender<ConnectionState>,
}

impl StateCell {
    fn new() -> Self {
        let (current, _) = watch::channel(ConnectionState::Closed);
        let (transitions, _) = broadcast::channel(TRANSITION_CAPACITY);
        Self {
            current,
            transitions,
        }
    }

    pub(crate) fn set(&self, state: ConnectionState) {
        let previous = self.current.send_replace(state);
        log::debug!("Push channel {previous:?} -> {state:?}");
        let _ = self.transitions.send(state);
    }

    fn get(&self) -> ConnectionState {
        *self.current.borrow()
    }
}

/// The channel task currently owned by the manager
struct LiveChannel {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Owner of the push channel and its reconnect loop
pub struct ConnectionManager<C> {
    connector: Arc<C>,
    store: StateStore,
    reconnect_delay: Duration,
    state: Arc<StateCell>,
    live: Mutex<Option<LiveChannel>>,
    outbound: parking_lot::Mutex<Option<mpsc::UnboundedSender<String>>>,
}

impl<C: ChannelConnector> ConnectionManager<C> {
    /// Create a manager with the default three-second reconnect delay
    pub fn new(connector: C, store: StateStore) -> Self {
        Self::with_reconnect_delay(connector, store, DEFAULT_RECONNECT_DELAY)
    }

    /// Create a manager with a custom reconnect delay
    pub fn with_reconnect_delay(connector: C, store: StateStore, reconnect_delay: Duration) -> Self {
        Self {
            connector: Arc::new(connector),
            store,
            reconnect_delay,
            state: Arc::new(StateCell::new()),
            live: Mutex::new(None),
            outbound: parking_lot::Mutex::new(None),
        }
    }

    /// Open the push channel, replacing any existing one
    ///
    /// Returns once the channel task is running; the channel itself opens
    /// in the background. Watch [`Self::subscribe_state`] for `Open`.
    pub async fn connect(&self) {
        let mut live = self.live.lock().await;
        if let Some(previous) = live.take() {
            log::info!("Replacing existing push channel");
            self.teardown(previous).await;
        }

        let cancel = CancellationToken::new();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let ctx = task::ChannelContext {
            connector: Arc::clone(&self.connector),
            store: self.store.clone(),
            state: Arc::clone(&self.state),
            reconnect_delay: self.reconnect_delay,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(task::run_channel(ctx, outbound_rx));

        *self.outbound.lock() = Some(outbound_tx);
        *live = Some(LiveChannel { cancel, task });
    }

    /// Close the push channel and suppress any pending reconnect
    ///
    /// After this returns no channel will reopen until `connect` is called
    /// again.
    pub async fn disconnect(&self) {
        let mut live = self.live.lock().await;
        let torn_down = match live.take() {
            Some(previous) => {
                self.teardown(previous).await;
                log::info!("Push channel disconnected");
                true
            }
            None => false,
        };
        if torn_down || self.state.get() != ConnectionState::Closed {
            self.state.set(ConnectionState::Closed);
        }
    }

    async fn teardown(&self, live: LiveChannel) {
        *self.outbound.lock() = None;
        live.cancel.cancel();

        let mut task = live.task;
        if tokio::time::timeout(TEARDOWN_TIMEOUT, &mut task).await.is_err() {
            log::warn!("Push channel task did not stop in time; aborting");
            task.abort();
        }
    }

    /// Current connection state
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Whether the channel is open
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Watch the current connection state
    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.current.subscribe()
    }

    /// Receive every state transition, in order
    #[must_use]
    pub fn subscribe_transitions(&self) -> broadcast::Receiver<ConnectionState> {
        self.state.transitions.subscribe()
    }

    /// Send a liveness check over the channel
    ///
    /// Returns whether the frame was queued.
    pub fn ping(&self) -> bool {
        self.send(ChannelRequest::Ping)
    }

    /// Ask the agent for an immediate status snapshot over the channel
    ///
    /// Returns whether the frame was queued.
    pub fn request_status(&self) -> bool {
        self.send(ChannelRequest::GetStatus)
    }

    fn send(&self, request: ChannelRequest) -> bool {
        if !self.is_connected() {
            log::debug!("Dropping {request:?}: push channel not open");
            return false;
        }
        let frame = match request.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("Failed to encode {request:?}: {e}");
                return false;
            }
        };
        self.outbound
            .lock()
            .as_ref()
            .is_some_and(|tx| tx.send(frame).is_ok())
    }
}

impl<C> Drop for ConnectionManager<C> {
    fn drop(&mut self) {
        if let Some(live) = self.live.get_mut().take() {
            live.cancel.cancel();
            live.task.abort();
        }
    }
}
