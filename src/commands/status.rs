//! # Status Command
//!
//! Compare the three name-spaces and report the differences as three
//! disjoint sets:
//!
//! - *to be committed*: index vs HEAD tree
//! - *not staged*: worktree vs index
//! - *untracked*: worktree files unknown to the index

use std::fs;

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::index::Index;
use crate::objects::{blob, tree};
use crate::refs;
use crate::Repository;

/// How a path differs between two name-spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    New,
    Modified,
    Deleted,
}

/// A labeled path in one of the status sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub kind: ChangeKind,
    pub path: String,
}

/// The full status report
#[derive(Debug, Clone, Default)]
pub struct StatusReport {
    /// Current branch, `None` when HEAD is detached
    pub branch: Option<String>,
    pub to_be_committed: Vec<StatusEntry>,
    pub not_staged: Vec<StatusEntry>,
    pub untracked: Vec<String>,
}

impl StatusReport {
    pub fn is_clean(&self) -> bool {
        self.to_be_committed.is_empty() && self.not_staged.is_empty() && self.untracked.is_empty()
    }
}

/// Compute the status report
pub fn run(repo: &Repository) -> Result<StatusReport> {
    let index = Index::load(repo)?;
    let head_map = tree::head_tree_map(repo)?;

    // index vs HEAD tree
    let mut to_be_committed = Vec::new();
    for (path, entry) in index.iter() {
        match head_map.get(path) {
            None => to_be_committed.push(StatusEntry {
                kind: ChangeKind::New,
                path: path.clone(),
            }),
            Some(head_hash) if *head_hash != entry.hash => to_be_committed.push(StatusEntry {
                kind: ChangeKind::Modified,
                path: path.clone(),
            }),
            Some(_) => {}
        }
    }
    for path in head_map.keys() {
        if !index.contains(path) {
            to_be_committed.push(StatusEntry {
                kind: ChangeKind::Deleted,
                path: path.clone(),
            });
        }
    }
    to_be_committed.sort_by(|a, b| a.path.cmp(&b.path));

    // worktree vs index
    let mut not_staged = Vec::new();
    for (path, entry) in index.iter() {
        let file_path = repo.work_path(path);
        let data = match fs::read(&file_path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                not_staged.push(StatusEntry {
                    kind: ChangeKind::Deleted,
                    path: path.clone(),
                });
                continue;
            }
            Err(e) => return Err(Error::io(&file_path, e)),
        };

        if blob::hash_blob(&data) != entry.hash {
            not_staged.push(StatusEntry {
                kind: ChangeKind::Modified,
                path: path.clone(),
            });
        }
    }

    // worktree files unknown to the index
    let mut untracked = Vec::new();
    for entry in WalkDir::new(&repo.root)
        .into_iter()
        .filter_entry(|e| e.file_name() != crate::ARBOR_DIR)
    {
        let entry = entry.map_err(|e| {
            let io = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("walk failed"));
            Error::io(&repo.root, io)
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        if let Some(key) = repo.index_key(entry.path()) {
            if !index.contains(&key) {
                untracked.push(key);
            }
        }
    }
    untracked.sort();

    Ok(StatusReport {
        branch: refs::current_branch(repo)?,
        to_be_committed,
        not_staged,
        untracked,
    })
}
