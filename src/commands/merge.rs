//! # Merge Command
//!
//! Combine another branch into the current one: a fast-forward when the
//! target is a descendant of HEAD, a three-way merge against a common
//! ancestor otherwise. Conflicts leave marked files in the worktree and no
//! commit; the user resolves and commits.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;

use crate::commands::{add, commit as commit_cmd};
use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::objects::{blob, commit, tree};
use crate::refs;
use crate::worktree;
use crate::Repository;

/// Which merge strategy applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeKind {
    FastForward,
    ThreeWay,
}

/// The result of a merge
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub kind: MergeKind,
    /// Branch that was merged in
    pub source: String,
    /// Branch that received the merge
    pub target: String,
    /// The resulting commit; `None` while conflicts await resolution
    pub commit: Option<Hash>,
    /// Paths left with conflict markers
    pub conflicts: Vec<String>,
    /// Paths resolved without conflict
    pub merged: Vec<String>,
}

impl MergeOutcome {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Merge `branch_name` into the current branch
pub fn run(repo: &Repository, branch_name: &str) -> Result<MergeOutcome> {
    let current = refs::current_branch(repo)?
        .ok_or_else(|| Error::NotFound("current branch (HEAD is detached)".to_string()))?;

    if branch_name == current {
        return Err(Error::SameBranch);
    }

    let target_hash = refs::resolve_ref(repo, branch_name)?;
    let head_hash = refs::resolve_head(repo)?
        .ok_or_else(|| Error::NotFound("no commits yet".to_string()))?;

    if is_ancestor(repo, &head_hash, &target_hash)? {
        fast_forward(repo, &target_hash)?;
        return Ok(MergeOutcome {
            kind: MergeKind::FastForward,
            source: branch_name.to_string(),
            target: current,
            commit: Some(target_hash),
            conflicts: Vec::new(),
            merged: Vec::new(),
        });
    }

    three_way(repo, branch_name, &current, &head_hash, &target_hash)
}

/// Whether `ancestor` is reachable from `tip` over the parent chain
fn is_ancestor(repo: &Repository, ancestor: &Hash, tip: &Hash) -> Result<bool> {
    let mut queue = vec![tip.clone()];
    let mut seen: HashSet<Hash> = HashSet::new();

    while let Some(hash) = queue.pop() {
        if hash == *ancestor {
            return Ok(true);
        }
        if !seen.insert(hash.clone()) {
            continue;
        }

        if let Some(parent) = commit::read_commit(repo, &hash)?.parent {
            queue.push(parent);
        }
    }

    Ok(false)
}

fn fast_forward(repo: &Repository, target_hash: &Hash) -> Result<()> {
    worktree::restore_commit(repo, target_hash)?;
    refs::advance_current(repo, target_hash)
}

fn three_way(
    repo: &Repository,
    branch_name: &str,
    current: &str,
    head_hash: &Hash,
    target_hash: &Hash,
) -> Result<MergeOutcome> {
    let base_hash = find_common_ancestor(repo, head_hash, target_hash)?;

    let base_map = tree::commit_path_map(repo, &base_hash)?;
    let head_map = tree::commit_path_map(repo, head_hash)?;
    let target_map = tree::commit_path_map(repo, target_hash)?;

    let mut all_paths: BTreeSet<&String> = base_map.keys().collect();
    all_paths.extend(head_map.keys());
    all_paths.extend(target_map.keys());

    let mut merged: BTreeMap<String, Option<Hash>> = BTreeMap::new();
    let mut conflicts = Vec::new();

    for path in all_paths {
        let base = base_map.get(path);
        let head = head_map.get(path);
        let target = target_map.get(path);

        if head == target {
            merged.insert(path.clone(), head.cloned());
        } else if base == head {
            // changed only in target
            merged.insert(path.clone(), target.cloned());
        } else if base == target {
            // changed only in head
            merged.insert(path.clone(), head.cloned());
        } else {
            write_conflict_file(repo, path, branch_name, head, target)?;
            conflicts.push(path.clone());
        }
    }

    let merged_paths: Vec<String> = merged.keys().cloned().collect();
    write_merged_files(repo, &merged)?;

    // restage everything, dropping deleted paths from the index
    add::run(repo, &[".".to_string()], true)?;

    if !conflicts.is_empty() {
        return Ok(MergeOutcome {
            kind: MergeKind::ThreeWay,
            source: branch_name.to_string(),
            target: current.to_string(),
            commit: None,
            conflicts,
            merged: merged_paths,
        });
    }

    let message = format!("Merge branch '{}' into '{}'", branch_name, current);
    let commit_hash = commit_cmd::run(repo, &message)?;

    Ok(MergeOutcome {
        kind: MergeKind::ThreeWay,
        source: branch_name.to_string(),
        target: current.to_string(),
        commit: Some(commit_hash),
        conflicts,
        merged: merged_paths,
    })
}

/// First commit reachable from both tips
///
/// Deterministic given the traversal order: the ancestor set of `a` is
/// collected first, then a BFS from `b` returns its first member found in
/// that set. Not necessarily the lowest merge base in criss-cross
/// histories.
fn find_common_ancestor(repo: &Repository, a: &Hash, b: &Hash) -> Result<Hash> {
    let mut ancestors: HashSet<Hash> = HashSet::new();
    let mut cursor = Some(a.clone());
    while let Some(hash) = cursor {
        if !ancestors.insert(hash.clone()) {
            break;
        }
        cursor = commit::read_commit(repo, &hash)?.parent;
    }

    let mut cursor = Some(b.clone());
    while let Some(hash) = cursor {
        if ancestors.contains(&hash) {
            return Ok(hash);
        }
        cursor = commit::read_commit(repo, &hash)?.parent;
    }

    Err(Error::NoCommonAncestor)
}

fn write_merged_files(repo: &Repository, merged: &BTreeMap<String, Option<Hash>>) -> Result<()> {
    for (path, hash) in merged {
        let file_path = repo.work_path(path);

        match hash {
            Some(hash) => {
                let data = blob::read_blob(repo, hash)?;
                if let Some(parent) = file_path.parent() {
                    fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
                }
                fs::write(&file_path, data).map_err(|e| Error::io(&file_path, e))?;
            }
            None => {
                // deleted in the winning side
                match fs::remove_file(&file_path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(Error::io(&file_path, e)),
                }
            }
        }
    }

    Ok(())
}

fn write_conflict_file(
    repo: &Repository,
    path: &str,
    branch_name: &str,
    head: Option<&Hash>,
    target: Option<&Hash>,
) -> Result<()> {
    let head_lines = conflict_side_lines(repo, head)?;
    let target_lines = conflict_side_lines(repo, target)?;

    let content = format!(
        "<<<<<<< HEAD\n{}\n=======\n{}\n>>>>>>> {}\n",
        head_lines.join("\n"),
        target_lines.join("\n"),
        branch_name
    );

    let file_path = repo.work_path(path);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::write(&file_path, content).map_err(|e| Error::io(&file_path, e))
}

/// Lines of one conflict side; a deleted side contributes none
fn conflict_side_lines(repo: &Repository, hash: Option<&Hash>) -> Result<Vec<String>> {
    match hash {
        Some(hash) => Ok(blob::split_lines(&blob::read_blob(repo, hash)?)),
        None => Ok(Vec::new()),
    }
}
