// Cache module for API responses.
// Bounded in-memory LRU store with TTL expiry, persisted to a single JSON file.

pub mod paths;
pub mod persist;
pub mod store;

pub use paths::default_cache_file;
pub use persist::{load_into, read_snapshot, save_snapshot};
pub use store::{CacheEntry, CacheStore, DEFAULT_CAPACITY, DEFAULT_TTL, SnapshotEntry};
