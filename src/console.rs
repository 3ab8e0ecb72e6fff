//! Top-level console wiring
//!
//! [`Console`] owns one [`StateStore`], one [`NotificationQueue`], the push
//! channel [`ConnectionManager`] and the [`CommandDispatcher`], all sharing
//! the same store. A presentation layer reads the store and notifications and
//! sends operator intents through [`Console::dispatcher`].
//!
//! # Example
//!
//! ```no_run
//! use bot_console::{Console, ConsoleOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let console = Console::remote(ConsoleOptions::from_env()?)?;
//! let report = console.start().await;
//! log::info!("bootstrap: {report:?}");
//!
//! console.dispatcher().start().await;
//!
//! console.shutdown().await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::api::ApiClient;
use crate::bootstrap::{BootstrapLoader, BootstrapReport};
use crate::connection::ConnectionManager;
use crate::dispatcher::CommandDispatcher;
use crate::notify::NotificationQueue;
use crate::store::StateStore;
use crate::transport::{ChannelConnector, PullTransport};
use crate::types::options::ConsoleOptions;

#[cfg(feature = "http")]
use crate::error::Result;
#[cfg(feature = "http")]
use crate::transport::{HttpTransport, WebSocketConnector};

/// Console wired to the real HTTP and WebSocket transports
#[cfg(feature = "http")]
pub type RemoteConsole = Console<HttpTransport, WebSocketConnector>;

/// State-sync and command-dispatch client for one remote agent
pub struct Console<T, C> {
    api: Arc<ApiClient<T>>,
    store: StateStore,
    notifications: NotificationQueue,
    connection: ConnectionManager<C>,
    dispatcher: CommandDispatcher<T>,
}

impl<T: PullTransport, C: ChannelConnector> Console<T, C> {
    /// Wire a console over the given transports
    ///
    /// Nothing is fetched or dialed until [`Self::start`].
    pub fn new(options: &ConsoleOptions, transport: T, connector: C) -> Self {
        let api = Arc::new(ApiClient::new(transport));
        let store = StateStore::new();
        let notifications = NotificationQueue::with_ttl(options.notification_ttl);
        let connection =
            ConnectionManager::with_reconnect_delay(connector, store.clone(), options.reconnect_delay);
        let dispatcher =
            CommandDispatcher::new(Arc::clone(&api), store.clone(), notifications.clone());

        Self {
            api,
            store,
            notifications,
            connection,
            dispatcher,
        }
    }

    /// Load initial state and open the push channel
    ///
    /// The channel is opened regardless of bootstrap failures.
    pub async fn start(&self) -> BootstrapReport {
        let loader =
            BootstrapLoader::new(Arc::clone(&self.api), self.store.clone(), self.notifications.clone());
        let report = loader.load().await;
        self.connection.connect().await;
        report
    }

    /// Close the push channel and cancel any pending reconnect
    pub async fn shutdown(&self) {
        self.connection.disconnect().await;
        log::info!("Console shut down");
    }

    /// Mirrored agent state
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Operator notifications
    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    /// Push channel manager
    pub fn connection(&self) -> &ConnectionManager<C> {
        &self.connection
    }

    /// Operator command entry point
    pub fn dispatcher(&self) -> &CommandDispatcher<T> {
        &self.dispatcher
    }

    /// Typed pull API, for calls the dispatcher does not cover
    pub fn api(&self) -> &ApiClient<T> {
        &self.api
    }
}

#[cfg(feature = "http")]
impl RemoteConsole {
    /// Console talking to the backend named in `options`
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn remote(options: ConsoleOptions) -> Result<Self> {
        let transport = HttpTransport::new(&options)?;
        let connector = WebSocketConnector::new(options.channel_url());
        Ok(Self::new(&options, transport, connector))
    }
}
