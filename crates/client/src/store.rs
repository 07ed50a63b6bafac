use fivedraw_core::{PersistenceStore, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

const STATE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StateFile {
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

pub fn default_state_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("FIVEDRAW_STATE") {
        return Some(PathBuf::from(path));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".fivedraw_state.json"))
}

/// Key/value store backed by one JSON file. Every call goes to disk so
/// two processes sharing the file see each other's writes.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> BTreeMap<String, String> {
        let body = match fs::read_to_string(&self.path) {
            Ok(body) => body,
            Err(err) if err.kind() == ErrorKind::NotFound => return BTreeMap::new(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "state file unreadable");
                return BTreeMap::new();
            }
        };
        match serde_json::from_str::<StateFile>(&body) {
            Ok(state) if state.version == STATE_SCHEMA_VERSION => state.entries,
            Ok(state) => {
                warn!(
                    path = %self.path.display(),
                    version = state.version,
                    expected = STATE_SCHEMA_VERSION,
                    "unsupported state file version"
                );
                BTreeMap::new()
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "state file is not valid JSON");
                BTreeMap::new()
            }
        }
    }

    fn write(&self, entries: BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let state = StateFile {
            version: STATE_SCHEMA_VERSION,
            entries,
        };
        let body = serde_json::to_string_pretty(&state)?;
        fs::write(&self.path, body)?;
        Ok(())
    }
}

impl PersistenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load().remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.load();
        entries.insert(key.to_string(), value.to_string());
        self.write(entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.load();
        if entries.remove(key).is_some() {
            self.write(entries)?;
        }
        Ok(())
    }
}
