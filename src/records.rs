//! Persisted best scores
//!
//! A single named integer per key. Only the speed-run level reads or writes
//! it; every other level uses a fixed threshold.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Best-score persistence used by the speed-run level
pub trait ScoreStore {
    /// Stored best for `key`, 0 if none
    fn best_score(&self, key: &str) -> u32;

    /// Overwrite the best for `key`
    fn set_best_score(&mut self, key: &str, score: u32) -> Result<(), StoreError>;

    /// Forget the best for `key`
    fn clear(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Key/score table, the on-disk shape of the record file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestScores {
    pub entries: BTreeMap<String, u32>,
}

impl BestScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> u32 {
        self.entries.get(key).copied().unwrap_or(0)
    }

    pub fn set(&mut self, key: &str, score: u32) {
        self.entries.insert(key.to_string(), score);
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }
}

/// In-memory store (tests, or when no record file is wanted)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    scores: BestScores,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one record
    pub fn with_score(key: &str, score: u32) -> Self {
        let mut store = Self::new();
        store.scores.set(key, score);
        store
    }
}

impl ScoreStore for MemoryStore {
    fn best_score(&self, key: &str) -> u32 {
        self.scores.get(key)
    }

    fn set_best_score(&mut self, key: &str, score: u32) -> Result<(), StoreError> {
        self.scores.set(key, score);
        Ok(())
    }

    fn clear(&mut self, key: &str) -> Result<(), StoreError> {
        self.scores.remove(key);
        Ok(())
    }
}

/// JSON record file, rewritten through a temp file on every change
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    scores: BestScores,
}

impl JsonFileStore {
    /// Open the record file; a missing file starts an empty table
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let scores = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No record file at {}, starting fresh", path.display());
                BestScores::new()
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        log::info!("Loaded {} record(s) from {}", scores.entries.len(), path.display());
        Ok(Self { path, scores })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.scores).map_err(StoreError::Serialize)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        log::debug!("Records saved ({} entries)", self.scores.entries.len());
        Ok(())
    }
}

impl ScoreStore for JsonFileStore {
    fn best_score(&self, key: &str) -> u32 {
        self.scores.get(key)
    }

    fn set_best_score(&mut self, key: &str, score: u32) -> Result<(), StoreError> {
        self.scores.set(key, score);
        self.save()
    }

    fn clear(&mut self, key: &str) -> Result<(), StoreError> {
        if self.scores.remove(key) {
            self.save()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_defaults_to_zero() {
        let store = MemoryStore::new();
        assert_eq!(store.best_score("SpeedRunHighScore"), 0);
    }

    #[test]
    fn test_memory_store_set_and_clear() {
        let mut store = MemoryStore::with_score("k", 50);
        assert_eq!(store.best_score("k"), 50);
        store.set_best_score("k", 75).unwrap();
        assert_eq!(store.best_score("k"), 75);
        store.clear("k").unwrap();
        assert_eq!(store.best_score("k"), 0);
    }

    #[test]
    fn test_file_store_persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.best_score("k"), 0);
        store.set_best_score("k", 120).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.best_score("k"), 120);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_file_store_clear_removes_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set_best_score("k", 9).unwrap();
        store.clear("k").unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.best_score("k"), 0);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        fs::write(&path, "not json").unwrap();

        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }
}
