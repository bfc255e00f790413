use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::StoreError;
use crate::record::Record;

/// `communities.json`: the whole collection, read at start and rewritten at end.
///
/// There is no locking. Two runs writing at once race and the last write wins,
/// so callers must serialize runs themselves (one workflow job at a time).
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<Record>, StoreError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        let records: Vec<Record> =
            serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;
        debug!("Loaded {} records from {}", records.len(), self.path.display());
        Ok(records)
    }

    /// Overwrite the file with `records`, pretty-printed with 2-space indent.
    pub fn save(&self, records: &[Record]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records)?;
        let temp_path = self.path.with_extension("json.tmp");
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        fs::write(&temp_path, json).map_err(write_err)?;
        fs::rename(&temp_path, &self.path).map_err(write_err)?;
        info!("Saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

// ── Tests ──
