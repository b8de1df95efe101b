use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use collector_core::{Config, ConfigError, StoredSettings};
use collector_logging::collector_info;
use tempfile::NamedTempFile;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("settings file {path:?} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode settings: {0}")]
    Encode(#[source] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ConfigError),
    #[error("settings lock poisoned")]
    Poisoned,
}

/// The options store shared with whatever UI toggles collection.
///
/// Every read goes back to the backing store so changes made elsewhere are
/// picked up without a restart.
pub trait ConfigStore: Send + Sync {
    fn load(&self) -> Result<StoredSettings, StoreError>;

    /// Read-modify-write under the store's lock.
    fn modify(
        &self,
        change: &mut dyn FnMut(&mut StoredSettings),
    ) -> Result<StoredSettings, StoreError>;

    fn config(&self) -> Result<Config, StoreError> {
        Ok(self.load()?.config())
    }

    /// Options-form save: rejects an invalid endpoint before persisting.
    fn save(&self, config: &Config) -> Result<(), StoreError> {
        config.validate()?;
        self.modify(&mut |settings| settings.apply(config.clone()))?;
        Ok(())
    }

    fn set_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        self.modify(&mut |settings| settings.enabled = enabled)?;
        Ok(())
    }

    /// Returns the new total.
    fn add_collected(&self, count: u64) -> Result<u64, StoreError> {
        let settings = self.modify(&mut |settings| {
            settings.collected_count = settings.collected_count.saturating_add(count);
        })?;
        Ok(settings.collected_count)
    }

    fn reset_collected(&self) -> Result<(), StoreError> {
        self.modify(&mut |settings| settings.collected_count = 0)?;
        Ok(())
    }

    fn mark_synced(&self, at: &str) -> Result<(), StoreError> {
        self.modify(&mut |settings| settings.last_sync = Some(at.to_string()))?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    settings: Mutex<StoredSettings>,
}

impl MemoryConfigStore {
    pub fn new(settings: StoredSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<StoredSettings, StoreError> {
        self.settings
            .lock()
            .map(|settings| settings.clone())
            .map_err(|_| StoreError::Poisoned)
    }

    fn modify(
        &self,
        change: &mut dyn FnMut(&mut StoredSettings),
    ) -> Result<StoredSettings, StoreError> {
        let mut guard = self.settings.lock().map_err(|_| StoreError::Poisoned)?;
        change(&mut *guard);
        Ok(guard.clone())
    }
}

/// JSON settings file, replaced atomically on every write.
#[derive(Debug)]
pub struct FileConfigStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileConfigStore {
    /// Opens the store, writing defaults for a missing file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self {
            path: path.into(),
            lock: Mutex::new(()),
        };
        if !store.path.exists() {
            write_atomic(&store.path, &encode(&StoredSettings::default())?)?;
            collector_info!("Initialized settings with defaults at {:?}", store.path);
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StoredSettings, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(StoredSettings::default());
            }
            Err(err) => return Err(err.into()),
        };
        serde_json::from_str(&text).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Result<StoredSettings, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        self.read()
    }

    fn modify(
        &self,
        change: &mut dyn FnMut(&mut StoredSettings),
    ) -> Result<StoredSettings, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut settings = self.read()?;
        change(&mut settings);
        write_atomic(&self.path, &encode(&settings)?)?;
        Ok(settings)
    }
}

fn encode(settings: &StoredSettings) -> Result<String, StoreError> {
    serde_json::to_string_pretty(settings).map_err(StoreError::Encode)
}

/// Write to a temp file next to `target`, then rename over it.
fn write_atomic(target: &Path, content: &str) -> Result<(), StoreError> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(target).map_err(|err| StoreError::Io(err.error))?;
    Ok(())
}
