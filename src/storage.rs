use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, error, info, trace};
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::{IslandCollection, IslandError, Result};

/// Loads and saves the whole island collection as one JSON file.
///
/// There is no per-island granularity: every save rewrites the file.
/// No locking is done across processes.
#[derive(Debug, Clone)]
pub struct IslandStorage {
    /// Backing file
    path: PathBuf,
}

impl IslandStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn failure(&self, message: impl std::fmt::Display) -> IslandError {
        IslandError::Storage {
            path: self.path.clone(),
            message: message.to_string(),
        }
    }

    /// Reads the collection from disk.
    ///
    /// A missing file is an empty collection. Every record is normalized,
    /// so legacy records come back in the current shape; the file itself is
    /// not rewritten.
    pub fn load(&self) -> Result<IslandCollection> {
        if !self.path.exists() {
            debug!(
                "Islands file {} does not exist yet, starting empty",
                self.path.display()
            );
            return Ok(IslandCollection::new());
        }

        let raw = fs::read_to_string(&self.path).map_err(|e| {
            error!("Failed to read islands file {}: {}", self.path.display(), e);
            self.failure(e)
        })?;

        if raw.trim().is_empty() {
            debug!("Islands file {} is empty", self.path.display());
            return Ok(IslandCollection::new());
        }

        let value: Value = serde_json::from_str(&raw).map_err(|e| {
            error!("Failed to parse islands file {}: {}", self.path.display(), e);
            self.failure(e)
        })?;

        let map = value.as_object().ok_or_else(|| {
            error!(
                "Islands file {} does not hold an id -> island map",
                self.path.display()
            );
            self.failure("expected a JSON object at the top level")
        })?;

        let islands = IslandCollection::from_map(map);
        info!(
            "Loaded {} islands from {}",
            islands.len(),
            self.path.display()
        );
        Ok(islands)
    }

    /// Overwrites the backing file with `islands`.
    ///
    /// Writes to a temporary file in the same directory and renames it over
    /// the target, so readers see either the old file or the new one.
    pub fn save(&self, islands: &IslandCollection) -> Result<()> {
        debug!(
            "Saving {} islands to {}",
            islands.len(),
            self.path.display()
        );

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !dir.exists() {
            debug!("Creating parent directory: {}", dir.display());
            fs::create_dir_all(dir).map_err(|e| {
                error!("Failed to create directory {}: {}", dir.display(), e);
                self.failure(e)
            })?;
        }

        trace!("Serializing islands to JSON");
        let json = serde_json::to_string_pretty(islands)?;

        let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            self.failure(e)
        })?;

        trace!("Writing to temporary file");
        let written = temp_file.write_all(json.as_bytes());
        let synced = written
            .and_then(|_| temp_file.flush())
            .and_then(|_| temp_file.as_file().sync_all());
        synced.map_err(|e| {
            error!("Failed to write temporary file: {}", e);
            self.failure(e)
        })?;

        temp_file.persist(&self.path).map_err(|e| {
            error!(
                "Failed to persist file {}: {}",
                self.path.display(),
                e.error
            );
            self.failure(e.error)
        })?;

        info!("Saved {} islands to {}", islands.len(), self.path.display());
        Ok(())
    }
}
