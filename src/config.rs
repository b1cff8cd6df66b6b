use std::fmt;
use std::time::Duration;

/// Connection settings shared by every [`Queue`](crate::Queue) built from it.
#[derive(Clone)]
pub struct Config {
    pub endpoint: String,
    pub token: Option<String>,
    /// Applied to create, statistics and lease deletion. Put and get are unbounded.
    pub admin_timeout: Duration,
    pub reuse_connections: bool,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_string(),
            token: None,
            admin_timeout: Duration::from_secs(2),
            reuse_connections: false,
            max_retries: 3,
            retry_delay: Duration::from_millis(100),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("admin_timeout", &self.admin_timeout)
            .field("reuse_connections", &self.reuse_connections)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Sent as `Authentication: token <token>` on every request.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    pub fn admin_timeout(mut self, timeout: Duration) -> Self {
        self.config.admin_timeout = timeout;
        self
    }

    pub fn admin_timeout_ms(mut self, ms: u64) -> Self {
        self.config.admin_timeout = Duration::from_millis(ms);
        self
    }

    /// Keep idle connections in a pool instead of closing after each request.
    pub fn reuse_connections(mut self, reuse: bool) -> Self {
        self.config.reuse_connections = reuse;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    pub fn retry_delay_ms(mut self, ms: u64) -> Self {
        self.config.retry_delay = Duration::from_millis(ms);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
