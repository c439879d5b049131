// Cache path utilities.
// Resolves where the response snapshot lives on disk.

use std::path::PathBuf;

use directories::ProjectDirs;

/// File name of the persisted response cache.
pub const CACHE_FILE_NAME: &str = "lru-cache.json";

/// Fallback location when no platform cache directory is available.
pub const FALLBACK_CACHE_FILE: &str = ".lru-cache.json";

/// Get the base cache directory (~/.cache/bugzilla-cache on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "bugzilla-cache").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Default path of the response cache file.
pub fn default_cache_file() -> PathBuf {
    cache_dir()
        .map(|dir| dir.join(CACHE_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_CACHE_FILE))
}
