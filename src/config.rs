// Client configuration.
// Host, cache location, and cache bounds, fixed once a client is built.

use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{DEFAULT_CAPACITY, DEFAULT_TTL, default_cache_file};

/// Public Mozilla Bugzilla instance.
pub const DEFAULT_HOST: &str = "https://bugzilla.mozilla.org";

/// Environment variable overriding the host.
pub const HOST_ENV: &str = "BUGZILLA_HOST";

/// Environment variable overriding the cache file path.
pub const CACHE_FILE_ENV: &str = "BUGZILLA_CACHE_FILE";

/// Settings for a cached Bugzilla client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL that request paths are resolved against.
    pub host: String,
    /// Where the response snapshot is persisted.
    pub cache_file: PathBuf,
    /// Maximum number of cached responses.
    pub capacity: usize,
    /// How long a cached response is served.
    pub ttl: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            cache_file: default_cache_file(),
            capacity: DEFAULT_CAPACITY,
            ttl: DEFAULT_TTL,
        }
    }
}

impl ClientConfig {
    /// Defaults, overridden by `BUGZILLA_HOST` and `BUGZILLA_CACHE_FILE` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(host) = lookup(HOST_ENV).filter(|v| !v.is_empty()) {
            config.host = host;
        }
        if let Some(path) = lookup(CACHE_FILE_ENV).filter(|v| !v.is_empty()) {
            config.cache_file = PathBuf::from(path);
        }
        config
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_cache_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_file = path.into();
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}
