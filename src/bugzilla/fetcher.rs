// Cache-or-fetch orchestration.
// Looks requests up by canonical URL, fetches on miss, and flushes the cache to disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::cache::{CacheStore, load_into, save_snapshot};
use crate::config::ClientConfig;
use crate::error::Result;

use super::client::{FetchedResponse, HttpTransport, Transport};
use super::query::{QueryParams, canonicalize};

/// A response as stored in, and returned from, the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    /// URL the data was served from.
    pub resolved_url: String,
    /// Parsed JSON body.
    pub data: Value,
}

impl From<FetchedResponse> for CachedResponse {
    fn from(response: FetchedResponse) -> Self {
        Self {
            resolved_url: response.resolved_url,
            data: response.data,
        }
    }
}

/// Fetches API responses through a persisted LRU cache.
///
/// The store is loaded once from `cache_file` at construction and rewritten in
/// full after every miss. The store lock is held for the whole of a fetch, so
/// concurrent misses for one key reach the network once.
pub struct CachedFetcher<T = HttpTransport> {
    host: Url,
    cache_file: PathBuf,
    transport: T,
    store: Mutex<CacheStore<CachedResponse>>,
}

impl CachedFetcher<HttpTransport> {
    /// Create a fetcher that talks to the network with `reqwest`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::with_transport(config, HttpTransport::new()?)
    }
}

impl<T: Transport> CachedFetcher<T> {
    /// Create a fetcher over a custom transport.
    pub fn with_transport(config: &ClientConfig, transport: T) -> Result<Self> {
        let host = Url::parse(&config.host)?;

        let mut store = CacheStore::new(config.capacity, config.ttl);
        load_into(&mut store, &config.cache_file);
        info!(
            host = %host,
            cache_file = %config.cache_file.display(),
            entries = store.len(),
            "response cache ready"
        );

        Ok(Self {
            host,
            cache_file: config.cache_file.clone(),
            transport,
            store: Mutex::new(store),
        })
    }

    pub fn host(&self) -> &Url {
        &self.host
    }

    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Canonical URL (and cache key) for a request.
    pub fn canonicalize(&self, path: &str, params: &QueryParams) -> Result<Url> {
        canonicalize(&self.host, path, params)
    }

    /// Fetch `path` with `params`, serving fresh cached responses without I/O.
    pub async fn fetch(&self, path: &str, params: &QueryParams) -> Result<CachedResponse> {
        let url = self.canonicalize(path, params)?;
        let key = url.as_str();

        let mut store = self.store.lock().await;
        if let Some(hit) = store.get(key) {
            debug!(key, "cache hit");
            return Ok(hit.clone());
        }

        debug!(key, "cache miss, fetching");
        let response = CachedResponse::from(self.transport.get(&url).await?);
        store.set(key, response.clone());

        // Written inline under the store lock so the file always matches memory.
        // Persistence only saves future requests; the fetched data is still good.
        if let Err(err) = save_snapshot(&store, &self.cache_file) {
            warn!(
                cache_file = %self.cache_file.display(),
                error = %err,
                "failed to persist response cache"
            );
        }

        Ok(response)
    }

    /// Look up a fresh cached response without touching the network.
    pub async fn cached(&self, path: &str, params: &QueryParams) -> Result<Option<CachedResponse>> {
        let url = self.canonicalize(path, params)?;
        let mut store = self.store.lock().await;
        Ok(store.get(url.as_str()).cloned())
    }

    /// Number of entries currently held in memory.
    pub async fn cache_len(&self) -> usize {
        self.store.lock().await.len()
    }

    /// Drop every cached response and persist the empty cache.
    pub async fn clear_cache(&self) -> Result<()> {
        let mut store = self.store.lock().await;
        store.clear();
        save_snapshot(&store, &self.cache_file)
    }
}
