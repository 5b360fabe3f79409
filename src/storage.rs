//! Storage for the persisted study session.

use anyhow::{Context, Result};
use log::{info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::session::SessionSnapshot;

/// Fixed name of the single session record.
pub const SESSION_FILE: &str = "session.json";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("failed to read session file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("session file {path:?} is malformed")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Handles session persistence in one directory.
pub struct SessionStore {
    data_dir: PathBuf,
}

impl SessionStore {
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;
        Ok(Self { data_dir })
    }

    /// Get default storage location.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("verbos")
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }

    /// Overwrites the stored record.
    pub fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        let path = self.session_path();
        let json = serde_json::to_string_pretty(snapshot).context("Failed to serialize session")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write session file: {:?}", path))?;
        Ok(())
    }

    /// Reads the stored record. `Ok(None)` when there is none.
    pub fn load(&self) -> Result<Option<SessionSnapshot>, StoreError> {
        let path = self.session_path();
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| StoreError::Malformed { path, source })
    }

    /// Like [`load`](Self::load), but anything unreadable counts as absent.
    pub fn load_or_discard(&self) -> Option<SessionSnapshot> {
        match self.load() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("discarding stored session: {:#}", anyhow::Error::new(err));
                None
            }
        }
    }

    /// Deletes the stored record. Returns whether there was one.
    pub fn clear(&self) -> Result<bool> {
        let path = self.session_path();
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("cleared stored session at {:?}", path);
                Ok(true)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => {
                Err(err).with_context(|| format!("Failed to remove session file: {:?}", path))
            }
        }
    }
}
