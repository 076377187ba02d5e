//! # Index (Staging Area)
//!
//! The index is the snapshot-in-progress: an ordered mapping of repository
//! path to staged blob hash. Paths always use `/` as separator regardless of
//! host OS, and never point into `.arbor`.
//!
//! On disk it is a pretty-printed JSON object:
//!
//! ```json
//! {
//!   "src/lib.rs": { "hash": "…40 hex…", "is_binary": false }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::Repository;

/// A single staged entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Hash of the staged blob
    pub hash: Hash,
    /// Advisory flag: diff falls back to hash comparison when set
    pub is_binary: bool,
}

/// The staging area: path → staged entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Index {
    entries: BTreeMap<String, IndexEntry>,
}

impl Index {
    /// Load the index, or an empty one if the file does not exist yet
    pub fn load(repo: &Repository) -> Result<Self> {
        let index_path = repo.index_path();

        let content = match fs::read_to_string(&index_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::io(&index_path, e)),
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(&content)
            .map_err(|e| Error::CorruptObject(format!("index: {}", e)))
    }

    /// Persist the index, replacing the previous file atomically
    pub fn save(&self, repo: &Repository) -> Result<()> {
        let index_path = repo.index_path();
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::CorruptObject(format!("index: {}", e)))?;

        let tmp_path = repo.arbor_dir.join("index.tmp");
        fs::write(&tmp_path, content).map_err(|e| Error::io(&tmp_path, e))?;
        fs::rename(&tmp_path, &index_path).map_err(|e| Error::io(&index_path, e))?;

        Ok(())
    }

    /// Add or replace an entry
    pub fn add_entry(&mut self, path: String, hash: Hash, is_binary: bool) {
        self.entries.insert(path, IndexEntry { hash, is_binary });
    }

    /// Remove an entry, returning it if it was present
    pub fn remove_entry(&mut self, path: &str) -> Option<IndexEntry> {
        self.entries.remove(path)
    }

    /// Get an entry by path
    pub fn get(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    /// Check if a path is staged
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Iterate entries in path order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &IndexEntry)> {
        self.entries.iter()
    }

    /// Staged paths in order
    pub fn paths(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// The flat path → hash map used by the tree builder
    pub fn hash_map(&self) -> BTreeMap<String, Hash> {
        self.entries
            .iter()
            .map(|(path, entry)| (path.clone(), entry.hash.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
