//! Persisted shortcut settings.
//!
//! The browser build reads the record from sync storage; native tools use
//! [`FileSettingsStore`], a JSON file shaped like the storage area:
//!
//! ```json
//! { "aiHotkeyShortcuts": { "newChat": { "key": "o", "shift": true } } }
//! ```

use crate::shortcut::ShortcutMap;

use serde_json::Value;

/// Well-known key of the shortcut record
pub const STORAGE_KEY: &str = "aiHotkeyShortcuts";

/// A new raw record delivered by the persistence layer
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsChange {
    /// `None` when the record was removed
    pub new_value: Option<Value>,
}

/// Shortcut record for a full map, in enumeration order
pub fn settings_record(map: &ShortcutMap) -> Value {
    let record = map
        .iter()
        .map(|(id, shortcut)| (id.as_str().to_string(), shortcut.to_value()))
        .collect::<serde_json::Map<_, _>>();
    Value::Object(record)
}

/// Pull the shortcut record out of a storage-area object
pub fn extract_record(area: &Value) -> Option<Value> {
    area.get(STORAGE_KEY).filter(|record| !record.is_null()).cloned()
}

#[cfg(feature = "native")]
pub use file_store::{FileSettingsStore, SettingsWatcher};

#[cfg(feature = "native")]
mod file_store {
    use super::{STORAGE_KEY, SettingsChange, extract_record};
    use crate::error::{Error, Result};

    use notify::{Event, RecursiveMode, Watcher};
    use serde_json::Value;
    use std::path::{Path, PathBuf};
    use tokio::sync::broadcast;

    /// JSON-file stand-in for browser sync storage
    #[derive(Debug, Clone)]
    pub struct FileSettingsStore {
        path: PathBuf,
        change_tx: broadcast::Sender<SettingsChange>,
    }

    impl FileSettingsStore {
        pub fn new<P: Into<PathBuf>>(path: P) -> Self {
            let (change_tx, _) = broadcast::channel(16);
            Self { path: path.into(), change_tx }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        /// Read the shortcut record; `Ok(None)` when the file or key is absent
        pub fn load(&self) -> Result<Option<Value>> {
            if !self.path.exists() {
                return Ok(None);
            }

            let content = std::fs::read_to_string(&self.path)
                .map_err(|e| Error::Storage(format!("failed to read {}: {}", self.path.display(), e)))?;
            if content.trim().is_empty() {
                return Ok(None);
            }

            let area: Value = serde_json::from_str(&content)
                .map_err(|e| Error::Storage(format!("corrupted settings file {}: {}", self.path.display(), e)))?;
            Ok(extract_record(&area))
        }

        /// Write the shortcut record and notify subscribers
        pub fn save(&self, record: &Value) -> Result<()> {
            let mut area = match self.path.exists() {
                true => std::fs::read_to_string(&self.path)
                    .ok()
                    .and_then(|content| serde_json::from_str::<Value>(&content).ok())
                    .filter(Value::is_object)
                    .unwrap_or_else(|| Value::Object(Default::default())),
                false => Value::Object(Default::default()),
            };

            if let Some(object) = area.as_object_mut() {
                object.insert(STORAGE_KEY.to_string(), record.clone());
            }

            if let Some(parent) = self.path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .map_err(|e| Error::Storage(format!("failed to create {}: {}", parent.display(), e)))?;
            }

            let content = serde_json::to_string_pretty(&area)?;
            std::fs::write(&self.path, content)
                .map_err(|e| Error::Storage(format!("failed to write {}: {}", self.path.display(), e)))?;

            tracing::debug!(path = %self.path.display(), "saved shortcut record");
            let _ = self.change_tx.send(SettingsChange { new_value: Some(record.clone()) });
            Ok(())
        }

        pub fn subscribe(&self) -> broadcast::Receiver<SettingsChange> {
            self.change_tx.subscribe()
        }

        /// Watch the file for edits made outside this process
        ///
        /// Each modification re-reads the record and broadcasts it to subscribers.
        pub fn watch(&self) -> Result<SettingsWatcher> {
            let store = self.clone();
            let file_name = self.path.file_name().map(|name| name.to_os_string());

            let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
                let Ok(event) = res else { return };
                if !(event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove()) {
                    return;
                }
                if !event.paths.iter().any(|path| path.file_name() == file_name.as_deref()) {
                    return;
                }

                match store.load() {
                    Ok(new_value) => {
                        let _ = store.change_tx.send(SettingsChange { new_value });
                    }
                    Err(err) => tracing::warn!(%err, "failed to reload shortcut record"),
                }
            })
            .map_err(|e| Error::Watcher(e.to_string()))?;

            let dir = match self.path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            watcher
                .watch(&dir, RecursiveMode::NonRecursive)
                .map_err(|e| Error::Watcher(e.to_string()))?;

            Ok(SettingsWatcher { _watcher: Box::new(watcher) })
        }
    }

    /// Keeps the file watcher alive; dropping it stops notifications
    pub struct SettingsWatcher {
        _watcher: Box<dyn Watcher + Send + Sync>,
    }
}
