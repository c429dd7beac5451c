//! JSON-file settings store.
//!
//! Stands in for the host's key-value settings storage when the plugin runs
//! from the command line. Every write persists immediately so a crashed
//! invocation never loses a token or language change.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use vidcast_core::SettingsStore;

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read settings file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write settings file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("corrupt settings file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("failed to encode settings: {0}")]
    Encode(serde_json::Error),

    #[error("failed to create settings directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
}

#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileSettings {
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let path = data_dir.join(SETTINGS_FILE);
        let values = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|source| StoreError::Read {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let contents =
            serde_json::to_string_pretty(&self.values).map_err(StoreError::Encode)?;
        fs::write(&self.path, contents).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_owned(), value.to_owned());
        if let Err(e) = self.persist() {
            tracing::error!("failed to persist settings: {e}");
        }
    }
}
