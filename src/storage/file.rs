//! YAML-file session storage

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use super::{SessionStorage, StorageEvent, event_channel, notify};
use crate::error::{ConfigError, Result, StorageError};

type Entries = BTreeMap<String, String>;

/// Session storage persisted to a YAML map on disk.
///
/// Every operation re-reads the file so that writes made by another process
/// are picked up on the next read. Clones share a notification channel;
/// changes made by other processes are not announced.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
    events: broadcast::Sender<StorageEvent>,
}

impl FileStorage {
    /// Open storage at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
            events: event_channel(),
        }
    }

    /// Get the default session file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".mola").join("session.yaml"))
    }

    /// Resolve an optional override to a concrete path.
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Entries> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }

        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| StorageError::Read(e.to_string()))?;
        if contents.trim().is_empty() {
            return Ok(Entries::new());
        }

        let entries = serde_yaml::from_str(&contents)
            .map_err(|e| StorageError::Read(format!("{}: {}", self.path.display(), e)))?;
        Ok(entries)
    }

    fn write_entries(&self, entries: &Entries) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Write(e.to_string()))?;
        }

        let contents =
            serde_yaml::to_string(entries).map_err(|e| StorageError::Write(e.to_string()))?;
        std::fs::write(&self.path, contents).map_err(|e| StorageError::Write(e.to_string()))?;

        // The token is a bearer credential; keep it private to the user
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)
                .map_err(|e| StorageError::Write(e.to_string()))?;
        }

        Ok(())
    }

    fn update(&self, key: &str, apply: impl FnOnce(&mut Entries)) -> Result<()> {
        {
            let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
            let mut entries = self.read_entries()?;
            apply(&mut entries);
            self.write_entries(&entries)?;
        }
        notify(&self.events, key);
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(key, |entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(key, |entries| {
            entries.remove(key);
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}
