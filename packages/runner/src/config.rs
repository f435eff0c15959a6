//! Runner configuration.

use std::time::Duration;

/// Fixed length of the simulated unit of work.
pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(3000);

/// Upper bound on a single completion notification request.
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Environment variable holding the notification endpoint.
pub const WEBHOOK_URL_ENV: &str = "WEBHOOK_URL";

/// Configuration for the dispatcher and notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Completion notification endpoint. `None` disables notifications.
    pub webhook_url: Option<String>,
    /// Duration of the simulated unit of work.
    pub processing_delay: Duration,
    /// Timeout for the outbound notification request.
    pub notify_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            processing_delay: DEFAULT_PROCESSING_DELAY,
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
        }
    }
}

impl RunnerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let webhook_url = lookup(WEBHOOK_URL_ENV)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        Self {
            webhook_url,
            ..Default::default()
        }
    }

    /// Set the notification endpoint.
    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    /// Set the simulated processing delay.
    pub fn with_processing_delay(mut self, delay: Duration) -> Self {
        self.processing_delay = delay;
        self
    }

    /// Set the notification timeout.
    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }
}
