//! Console options and configuration
//!
//! This module contains the connection and timing options for the console,
//! including a builder pattern for easy configuration.

use std::time::Duration;

use crate::error::{ConsoleError, Result};

// ============================================================================
// Defaults
// ============================================================================

/// Default agent backend address
pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";

/// Default prefix shared by every API route
pub const DEFAULT_API_PREFIX: &str = "/api";

/// Fixed delay between push-channel reconnect attempts
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Lifetime of a posted notification
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// Upper bound on a single pull call
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Route of the push channel below the API prefix
const CHANNEL_PATH: &str = "/bot/ws";

// ============================================================================
// Console Options
// ============================================================================

/// Main options for the console
#[derive(Debug, Clone)]
pub struct ConsoleOptions {
    /// Backend base URL, e.g. `http://localhost:8001`
    pub base_url: String,
    /// Prefix shared by every API route
    pub api_prefix: String,
    /// Delay before each push-channel reconnect attempt
    pub reconnect_delay: Duration,
    /// How long a notification stays visible
    pub notification_ttl: Duration,
    /// Timeout applied to every pull call
    pub request_timeout: Duration,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ConsoleOptions {
    /// Create a new builder for `ConsoleOptions`
    #[must_use]
    pub fn builder() -> ConsoleOptionsBuilder {
        ConsoleOptionsBuilder::default()
    }

    /// Build options from `BOT_CONSOLE_*` environment variables
    ///
    /// Recognised variables: `BOT_CONSOLE_BACKEND_URL`,
    /// `BOT_CONSOLE_RECONNECT_MS` and `BOT_CONSOLE_REQUEST_TIMEOUT_SECS`.
    ///
    /// # Errors
    /// Returns error if a numeric variable does not parse
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build options from an arbitrary key lookup
    ///
    /// # Errors
    /// Returns error if a numeric value does not parse
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut builder = Self::builder();

        if let Some(url) = lookup("BOT_CONSOLE_BACKEND_URL") {
            builder = builder.base_url(url);
        }
        if let Some(raw) = lookup("BOT_CONSOLE_RECONNECT_MS") {
            let ms = parse_number("BOT_CONSOLE_RECONNECT_MS", &raw)?;
            builder = builder.reconnect_delay(Duration::from_millis(ms));
        }
        if let Some(raw) = lookup("BOT_CONSOLE_REQUEST_TIMEOUT_SECS") {
            let secs = parse_number("BOT_CONSOLE_REQUEST_TIMEOUT_SECS", &raw)?;
            builder = builder.request_timeout(Duration::from_secs(secs));
        }

        Ok(builder.build())
    }

    /// Full URL of an API route
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}{}{}",
            self.base_url.trim_end_matches('/'),
            self.api_prefix,
            path
        )
    }

    /// URL of the push channel, with the scheme switched to ws/wss
    #[must_use]
    pub fn channel_url(&self) -> String {
        let http = self.api_url(CHANNEL_PATH);
        if let Some(rest) = http.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = http.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            http
        }
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| ConsoleError::invalid_config(format!("{key} must be an integer, got {raw:?}")))
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ConsoleOptions`]
#[derive(Debug, Default)]
pub struct ConsoleOptionsBuilder {
    options: ConsoleOptions,
}

impl ConsoleOptionsBuilder {
    /// Set the backend base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.options.base_url = url.into();
        self
    }

    /// Set the API prefix
    #[must_use]
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.api_prefix = prefix.into();
        self
    }

    /// Set the reconnect delay
    #[must_use]
    pub const fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.options.reconnect_delay = delay;
        self
    }

    /// Set the notification lifetime
    #[must_use]
    pub const fn notification_ttl(mut self, ttl: Duration) -> Self {
        self.options.notification_ttl = ttl;
        self
    }

    /// Set the pull-call timeout
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.options.request_timeout = timeout;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> ConsoleOptions {
        self.options
    }
}
