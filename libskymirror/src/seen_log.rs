//! Bounded, persisted record of previously published identifiers
//!
//! The seen-log is a sliding window, not a full history: at most `capacity`
//! identifiers are retained, oldest evicted first. It is loaded once at
//! process start and written back wholesale after every successful publish,
//! so a crash loses at most the persistence of the final append.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

/// In-memory seen-log: ordered identifiers, insertion order = publish order.
#[derive(Debug, Clone)]
pub struct SeenLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl SeenLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.iter().any(|e| e == identifier)
    }

    /// Append an identifier, evicting the oldest entries while over capacity.
    pub fn insert(&mut self, identifier: String) {
        self.entries.push_back(identifier);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Identifiers in insertion order, oldest first
    pub fn entries(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    fn from_entries(entries: Vec<String>, capacity: usize) -> Self {
        let mut log = Self::new(capacity);
        // A log persisted with a larger capacity keeps only the newest K
        for entry in entries {
            log.insert(entry);
        }
        log
    }
}

/// File-backed storage for the seen-log: a single JSON array of identifiers.
#[derive(Debug, Clone)]
pub struct SeenLogStore {
    path: PathBuf,
}

impl SeenLogStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let expanded = shellexpand::tilde(&path.as_ref().to_string_lossy().to_string()).to_string();
        Self {
            path: PathBuf::from(expanded),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the seen-log, returning an empty log when the file is absent.
    pub fn load(&self, capacity: usize) -> Result<SeenLog> {
        if !self.path.exists() {
            return Ok(SeenLog::new(capacity));
        }

        let content = std::fs::read_to_string(&self.path).map_err(StoreError::Io)?;
        let entries: Vec<String> = serde_json::from_str(&content).map_err(StoreError::Parse)?;
        Ok(SeenLog::from_entries(entries, capacity))
    }

    /// Persist the whole log, replacing any previous contents.
    pub fn save(&self, log: &SeenLog) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(StoreError::Io)?;
        }

        let content = serde_json::to_string(&log.entries()).map_err(StoreError::Parse)?;
        std::fs::write(&self.path, content).map_err(StoreError::Io)?;
        Ok(())
    }
}
