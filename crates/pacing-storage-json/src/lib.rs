//! pacing-storage-json
//!
//! Durable JSON snapshots of pacing state, so brands, campaigns and the spend
//! audit trail survive process restarts.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use pacing_core::{snapshot_warnings, CoreError, InMemoryStore, PacingStore, StoreSnapshot};
use tracing::{debug, warn};

const TMP_SUFFIX: &str = "tmp";

/// Filesystem-backed JSON persistence for a single state file.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStorage {
    path: PathBuf,
}

impl JsonSnapshotStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads the snapshot. A missing file is an empty state.
    pub fn load(&self) -> Result<StoreSnapshot, CoreError> {
        if !self.exists() {
            return Ok(StoreSnapshot::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let snapshot: StoreSnapshot =
            serde_json::from_str(&data).map_err(|err| CoreError::Storage(err.to_string()))?;
        for warning in snapshot_warnings(&snapshot) {
            warn!(path = %self.path.display(), "{warning}");
        }
        Ok(snapshot)
    }

    /// Loads the state file straight into a ready-to-use store.
    pub fn load_store(&self) -> Result<InMemoryStore, CoreError> {
        InMemoryStore::from_snapshot(self.load()?)
    }

    /// Writes the snapshot by staging to a temporary file and renaming it into place.
    pub fn save(&self, snapshot: &StoreSnapshot) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|err| CoreError::Storage(err.to_string()))?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(
            path = %self.path.display(),
            brands = snapshot.brands.len(),
            campaigns = snapshot.campaigns.len(),
            spend_logs = snapshot.spend_logs.len(),
            "Saved pacing state"
        );
        Ok(())
    }

    pub fn save_store(&self, store: &dyn PacingStore) -> Result<(), CoreError> {
        self.save(&store.snapshot())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
