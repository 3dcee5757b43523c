//! Session log persistence

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::error::Result;
use crate::training::records::SessionLog;

/// Writes session logs as pretty JSON into one directory
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, log: &SessionLog) -> PathBuf {
        self.dir.join(log.file_name())
    }

    /// Write (or overwrite) the log's file. Safe to call after every round.
    pub fn save(&self, log: &SessionLog) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(log);
        fs::write(&path, serde_json::to_string_pretty(log)?)?;
        info!(path = %path.display(), rounds = log.rounds.len(), "session log saved");
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<SessionLog> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
