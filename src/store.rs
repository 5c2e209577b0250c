//! Persistence for the current worksheet settings.
//!
//! The generation engine never touches a store; only the service layer
//! loads settings at startup and saves them after each edit.

use std::fs::{create_dir_all, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use crate::domain::Settings;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml decode error: {0}")]
    Decode(#[from] toml::de::Error),
    #[error("toml encode error: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("invalid store path: {0}")]
    InvalidPath(String),
}

pub trait SettingsStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Settings>, StoreError>;
    fn save(&self, settings: &Settings) -> Result<(), StoreError>;
}

/// Settings kept as a TOML file, replaced atomically on save.
pub struct TomlFileStore {
    path: PathBuf,
}

impl TomlFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for TomlFileStore {
    fn load(&self) -> Result<Option<Settings>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(Some(toml::from_str(&content)?))
    }

    fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        let encoded = toml::to_string_pretty(settings)?;
        write_atomic(&self.path, encoded.as_bytes())
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }
    let file_name = path
        .file_name()
        .ok_or_else(|| StoreError::InvalidPath(path.display().to_string()))?;
    let tmp_path = path.with_file_name(format!("{}.tmp", file_name.to_string_lossy()));

    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Process-local store, used when no settings path is configured.
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Settings>>,
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Option<Settings>, StoreError> {
        Ok(self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(settings.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IntRange, Operation};
    use std::collections::BTreeSet;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("mathdrill-store-{}", uuid::Uuid::new_v4()))
            .join("settings.toml")
    }

    #[test]
    fn toml_store_round_trips_settings() {
        let path = scratch_path();
        let store = TomlFileStore::new(&path);
        assert!(store.load().unwrap().is_none());

        let settings = Settings {
            operations: BTreeSet::from([Operation::Mul, Operation::Div]),
            num_range: IntRange(2, 12),
            result_range: IntRange(1, 144),
            show_answers: true,
            ..Settings::default()
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), Some(settings));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("numRange"), "{raw}");
        assert!(!path.with_file_name("settings.toml.tmp").exists());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let path = scratch_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "operations = 7").unwrap();
        let err = TomlFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn memory_store_keeps_last_save() {
        let store = MemoryStore::default();
        assert!(store.load().unwrap().is_none());
        let s = Settings { num_problems: 33, ..Settings::default() };
        store.save(&s).unwrap();
        assert_eq!(store.load().unwrap().map(|s| s.num_problems), Some(33));
    }
}
