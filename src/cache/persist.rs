// Snapshot persistence for the response cache.
// Reads and writes the whole store as one JSON document.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::error::{BugzillaError, Result};

use super::store::{CacheStore, SnapshotEntry};

/// Snapshot format version written to disk.
pub const SNAPSHOT_VERSION: u32 = 1;

/// On-disk snapshot document.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile<V> {
    version: u32,
    entries: Vec<SnapshotEntry<V>>,
}

/// Read a snapshot file. A missing file is `Ok(None)`; another format version is an error.
pub fn read_snapshot<V: DeserializeOwned>(path: &Path) -> Result<Option<Vec<SnapshotEntry<V>>>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)?;
    let file: SnapshotFile<V> = serde_json::from_str(&contents)?;
    if file.version != SNAPSHOT_VERSION {
        return Err(BugzillaError::Other(format!(
            "unsupported cache snapshot version {} (expected {})",
            file.version, SNAPSHOT_VERSION
        )));
    }
    Ok(Some(file.entries))
}

/// Populate a store from disk, treating any failure as an empty cache.
pub fn load_into<V: Clone + DeserializeOwned>(store: &mut CacheStore<V>, path: &Path) {
    match read_snapshot(path) {
        Ok(Some(entries)) => {
            store.load(entries);
            debug!(path = %path.display(), entries = store.len(), "loaded response cache");
        }
        Ok(None) => {
            debug!(path = %path.display(), "no response cache on disk");
            store.clear();
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable response cache");
            store.clear();
        }
    }
}

/// Write the whole store to disk.
pub fn save_snapshot<V: Clone + Serialize>(store: &CacheStore<V>, path: &Path) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = SnapshotFile {
        version: SNAPSHOT_VERSION,
        entries: store.snapshot(),
    };
    let json = serde_json::to_string(&file)?;

    // Write atomically via temp file
    let temp_path = path.with_extension("tmp");
    let mut out = fs::File::create(&temp_path)?;
    out.write_all(json.as_bytes())?;
    out.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}
