use std::time::Duration;

use super::error::{Error, Result};

/// Upper bound for one request, including body drain. Also bounds shutdown latency.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Monitor cadence.
pub const MONITOR_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub url: String,
    /// Number of request workers.
    pub concurrency: u64,
    pub duration: Duration,
    /// Pause between two requests of the same worker.
    pub delay: Duration,
    pub request_timeout: Duration,
    pub connect_timeout: Option<Duration>,
}

impl RunConfig {
    pub fn new(url: impl Into<String>, concurrency: u64, duration: Duration) -> Self {
        Self {
            url: url.into(),
            concurrency,
            duration,
            delay: Duration::ZERO,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(Error::InvalidConcurrency);
        }
        if self.duration.is_zero() {
            return Err(Error::InvalidDuration);
        }
        if self.request_timeout.is_zero() {
            return Err(Error::InvalidRequestTimeout);
        }
        Ok(())
    }
}
