//! Bugzilla REST client with a disk-persisted response cache.
//!
//! Requests are keyed by their canonical URL and served from a bounded LRU
//! store with a fixed TTL. The store is reloaded from a JSON snapshot when a
//! client is built and rewritten after every cache miss.

pub mod bugzilla;
pub mod cache;
pub mod config;
pub mod error;

pub use bugzilla::{
    BugzillaClient, CachedFetcher, CachedResponse, FetchedResponse, HttpTransport, ParamValue,
    QueryParams, Transport,
};
pub use config::ClientConfig;
pub use error::{BugzillaError, Result};
