//! Immutable client configuration.
//!
//! Constructed once at process start and passed by reference to every
//! component that needs it; there is no ambient global configuration.

use std::time::Duration;

/// Default chat poll interval.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default per-request timeout. The backend is expected to always respond,
/// but a hung request must not leave a view loading forever.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the REST gateway and the polling tasks.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST backend, e.g. `https://api.example.com`.
    /// Stored without a trailing slash.
    pub api_base_url: String,
    /// Fixed interval between chat poll ticks.
    pub poll_interval: Duration,
    /// Timeout applied to every HTTP request.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Build a configuration with the default poll interval and timeout.
    pub fn new(api_base_url: impl Into<String>) -> Self {
        let mut api_base_url = api_base_url.into();
        while api_base_url.ends_with('/') {
            api_base_url.pop();
        }
        Self {
            api_base_url,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_stripped() {
        let config = ClientConfig::new("https://api.example.com/");
        assert_eq!(config.api_base_url, "https://api.example.com");
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("http://localhost:8080");
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builder_overrides() {
        let config = ClientConfig::new("http://localhost:8080")
            .with_poll_interval(Duration::from_secs(2))
            .with_request_timeout(Duration::from_secs(10));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }
}
