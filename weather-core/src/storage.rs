//! Local key-value persistence for the last used locations.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::model::{Coordinates, ResolvedLocation};

pub const LAST_LOCATION_KEY: &str = "lastLocation";
pub const LAST_AUTO_LOCATION_KEY: &str = "lastAutoLocation";

/// Synchronous string store with atomic single-key reads and writes.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-process store. `unavailable()` builds one that rejects every access.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self { values: Mutex::default(), unavailable: true }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Remembers the last manually chosen location and the last auto-detected
/// coordinates. Saving is best-effort and reading never fails: every storage
/// problem is logged and treated as "nothing stored".
#[derive(Clone)]
pub struct LocationStore {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for LocationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationStore").finish_non_exhaustive()
    }
}

impl LocationStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn save_last_location(&self, location: &ResolvedLocation) {
        self.save(LAST_LOCATION_KEY, location);
    }

    pub fn last_location(&self) -> Option<ResolvedLocation> {
        self.load(LAST_LOCATION_KEY)
    }

    pub fn save_auto_location(&self, coords: Coordinates) {
        self.save(LAST_AUTO_LOCATION_KEY, &coords);
    }

    pub fn last_auto_location(&self) -> Option<Coordinates> {
        self.load(LAST_AUTO_LOCATION_KEY)
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(StorageError::from)
            .and_then(|json| self.store.set(key, &json));

        match result {
            Ok(()) => debug!(key, "Saved location"),
            Err(e) => warn!(key, "Failed to save location: {e}"),
        }
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, "Failed to read stored location: {e}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, "Ignoring corrupt stored location: {e}");
                None
            }
        }
    }
}
