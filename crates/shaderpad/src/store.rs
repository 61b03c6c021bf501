use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tracing::warn;

use playground::PersistentStore;

/// Durable key → string store backed by one JSON file.
///
/// Reads happen once at startup; every `set` rewrites the file. Write
/// failures are logged and the in-memory view stays authoritative for the
/// rest of the session, so a full disk never stalls the render loop.
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(path = %path.display(), %err, "store file is unparsable; starting empty");
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        Self { path, entries }
    }

    fn write_back(&self) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!(path = %parent.display(), %err, "failed to create store directory");
                return;
            }
        }
        match serde_json::to_string_pretty(&self.entries) {
            Ok(raw) => {
                if let Err(err) = fs::write(&self.path, raw) {
                    warn!(path = %self.path.display(), %err, "failed to write store file");
                }
            }
            Err(err) => warn!(%err, "failed to encode store contents"),
        }
    }
}

impl PersistentStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        self.write_back();
    }
}
