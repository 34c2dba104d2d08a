//! Key-value persistence for session offsets
//!
//! The tracker persists exactly two integers under fixed keys. Hosts plug in
//! their platform preferences store through [`KeyValueStore`]; an in-memory
//! store and a flat JSON file store ship with the crate.

use crate::error::TrackerError;
use crate::types::SessionState;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Preferences namespace the keys live under
pub const PREFS_NAME: &str = "FitnessPrefs";

/// Key for the offset captured at the last reset
pub const KEY_PREVIOUS_TOTAL_STEPS: &str = "previousTotalSteps";

/// Key for the last cumulative count seen
pub const KEY_TOTAL_STEPS: &str = "totalSteps";

/// Flat integer key-value store
pub trait KeyValueStore {
    /// Read an integer; `None` when the key was never written
    fn get_int(&self, key: &str) -> Result<Option<i64>, TrackerError>;

    /// Stage an integer write
    fn put_int(&mut self, key: &str, value: i64) -> Result<(), TrackerError>;

    /// Make staged writes durable
    fn commit(&mut self) -> Result<(), TrackerError>;
}

/// Load session offsets; missing keys read as 0
pub fn load_session(store: &dyn KeyValueStore) -> Result<SessionState, TrackerError> {
    Ok(SessionState {
        total_steps: store.get_int(KEY_TOTAL_STEPS)?.unwrap_or(0),
        previous_total_steps: store.get_int(KEY_PREVIOUS_TOTAL_STEPS)?.unwrap_or(0),
    })
}

/// Write both offsets and commit
pub fn save_session(store: &mut dyn KeyValueStore, state: &SessionState) -> Result<(), TrackerError> {
    store.put_int(KEY_PREVIOUS_TOTAL_STEPS, state.previous_total_steps)?;
    store.put_int(KEY_TOTAL_STEPS, state.total_steps)?;
    store.commit()
}

/// Volatile store, for tests and hosts that persist on their own
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, i64>,
    commits: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with saved offsets
    pub fn with_session(state: &SessionState) -> Self {
        let mut values = BTreeMap::new();
        values.insert(KEY_TOTAL_STEPS.to_string(), state.total_steps);
        values.insert(
            KEY_PREVIOUS_TOTAL_STEPS.to_string(),
            state.previous_total_steps,
        );
        Self { values, commits: 0 }
    }

    /// Number of commits so far
    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl KeyValueStore for MemoryStore {
    fn get_int(&self, key: &str) -> Result<Option<i64>, TrackerError> {
        Ok(self.values.get(key).copied())
    }

    fn put_int(&mut self, key: &str, value: i64) -> Result<(), TrackerError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), TrackerError> {
        self.commits += 1;
        Ok(())
    }
}

/// Store backed by a flat JSON object on disk.
///
/// Writes are staged in memory and land on disk at `commit`, via a temporary
/// file renamed over the target.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, i64>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TrackerError> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    TrackerError::StorageError(format!(
                        "Corrupt state file {}: {}",
                        path.display(),
                        e
                    ))
                })?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), keys = values.len(), "Opened state file");
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_int(&self, key: &str) -> Result<Option<i64>, TrackerError> {
        Ok(self.values.get(key).copied())
    }

    fn put_int(&mut self, key: &str, value: i64) -> Result<(), TrackerError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), TrackerError> {
        let json = serde_json::to_string_pretty(&self.values)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "Committed state file");
        Ok(())
    }
}
