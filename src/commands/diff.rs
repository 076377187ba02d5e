//! # Diff Command
//!
//! Per-file longest-common-subsequence line diffs across the three
//! name-spaces.
//!
//! ## Usage
//!
//! ```bash
//! # Working tree vs index (unstaged changes)
//! arbor diff
//!
//! # Index vs HEAD (staged changes)
//! arbor diff --staged
//!
//! # Between two commits
//! arbor diff <commitA> <commitB>
//!
//! # Limit any mode to specific files
//! arbor diff --paths src/lib.rs
//! ```
//!
//! Binary files are never line-diffed; a hash-pair record is emitted
//! instead.

use std::collections::BTreeSet;
use std::fs;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::index::Index;
use crate::objects::{blob, tree};
use crate::Repository;

/// Classification of one diff output line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Equal,
    Remove,
    Add,
}

impl LineKind {
    /// The rendering marker: `" "`, `"-"` or `"+"`
    pub fn marker(&self) -> &'static str {
        match self {
            LineKind::Equal => " ",
            LineKind::Remove => "-",
            LineKind::Add => "+",
        }
    }
}

/// One line of a textual diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub kind: LineKind,
    pub text: String,
}

/// The diff of a single file between two sides
#[derive(Debug, Clone)]
pub struct FileDiff {
    /// `/`-separated repository path
    pub path: String,
    /// Hash on the old side, if that side has the file as a stored blob
    pub a_hash: Option<Hash>,
    /// Hash on the new side, if known
    pub b_hash: Option<Hash>,
    /// Line edits; `None` marks a binary comparison
    pub lines: Option<Vec<DiffLine>>,
}

impl FileDiff {
    pub fn is_binary(&self) -> bool {
        self.lines.is_none()
    }
}

/// Diff the working tree against the index
///
/// Only tracked paths participate; a tracked file missing from the worktree
/// diffs against the empty document.
pub fn worktree_vs_index(repo: &Repository, paths: &[String]) -> Result<Vec<FileDiff>> {
    let index = Index::load(repo)?;
    let targets = target_set(paths);

    let mut results = Vec::new();
    for (path, entry) in index.iter() {
        if skipped(&targets, path) {
            continue;
        }

        let work_data = read_work_file(repo, path)?;

        if entry.is_binary {
            let work_hash = blob::hash_blob(&work_data);
            if work_hash != entry.hash {
                results.push(FileDiff {
                    path: path.clone(),
                    a_hash: Some(entry.hash.clone()),
                    b_hash: Some(work_hash),
                    lines: None,
                });
            }
            continue;
        }

        let index_lines = blob::split_lines(&blob::read_blob(repo, &entry.hash)?);
        let work_lines = blob::split_lines(&work_data);
        if index_lines == work_lines {
            continue;
        }

        results.push(FileDiff {
            path: path.clone(),
            a_hash: Some(entry.hash.clone()),
            b_hash: None,
            lines: Some(lcs_diff(&index_lines, &work_lines)),
        });
    }

    Ok(results)
}

/// Diff the index against the HEAD tree (staged changes)
pub fn index_vs_head(repo: &Repository, paths: &[String]) -> Result<Vec<FileDiff>> {
    let index = Index::load(repo)?;
    let head_map = tree::head_tree_map(repo)?;
    let targets = target_set(paths);

    let mut seen: BTreeSet<String> = index.paths().cloned().collect();
    seen.extend(head_map.keys().cloned());

    let mut results = Vec::new();
    for path in seen {
        if skipped(&targets, &path) {
            continue;
        }

        let index_entry = index.get(&path);
        let head_hash = head_map.get(&path);

        if index_entry.is_some_and(|e| e.is_binary) {
            let index_hash = index_entry.map(|e| &e.hash);
            if index_hash == head_hash {
                continue;
            }
            results.push(FileDiff {
                path,
                a_hash: head_hash.cloned(),
                b_hash: index_hash.cloned(),
                lines: None,
            });
            continue;
        }

        let index_lines = side_lines(repo, index_entry.map(|e| &e.hash))?;
        let head_lines = side_lines(repo, head_hash)?;
        if index_lines == head_lines {
            continue;
        }

        results.push(FileDiff {
            path,
            a_hash: head_hash.cloned(),
            b_hash: index_entry.map(|e| e.hash.clone()),
            lines: Some(lcs_diff(&head_lines, &index_lines)),
        });
    }

    Ok(results)
}

/// Diff two commits by flattening and comparing their trees
pub fn commits(repo: &Repository, commit_a: &str, commit_b: &str, paths: &[String]) -> Result<Vec<FileDiff>> {
    let hash_a = Hash::from_hex(commit_a)?;
    let hash_b = Hash::from_hex(commit_b)?;

    let map_a = tree::commit_path_map(repo, &hash_a)?;
    let map_b = tree::commit_path_map(repo, &hash_b)?;
    let targets = target_set(paths);

    let mut seen: BTreeSet<String> = map_a.keys().cloned().collect();
    seen.extend(map_b.keys().cloned());

    let mut results = Vec::new();
    for path in seen {
        if skipped(&targets, &path) {
            continue;
        }

        let a = map_a.get(&path);
        let b = map_b.get(&path);
        if a == b {
            continue;
        }

        let a_data = side_data(repo, a)?;
        let b_data = side_data(repo, b)?;

        if blob::is_binary(&a_data) || blob::is_binary(&b_data) {
            results.push(FileDiff {
                path,
                a_hash: a.cloned(),
                b_hash: b.cloned(),
                lines: None,
            });
            continue;
        }

        let a_lines = blob::split_lines(&a_data);
        let b_lines = blob::split_lines(&b_data);
        if a_lines == b_lines {
            continue;
        }

        results.push(FileDiff {
            path,
            a_hash: a.cloned(),
            b_hash: b.cloned(),
            lines: Some(lcs_diff(&a_lines, &b_lines)),
        });
    }

    Ok(results)
}

fn read_work_file(repo: &Repository, path: &str) -> Result<Vec<u8>> {
    let file_path = repo.work_path(path);
    match fs::read(&file_path) {
        Ok(data) => Ok(data),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(Error::io(&file_path, e)),
    }
}

/// Lines of an optional blob; a missing side is the empty document
fn side_lines(repo: &Repository, hash: Option<&Hash>) -> Result<Vec<String>> {
    Ok(blob::split_lines(&side_data(repo, hash)?))
}

fn side_data(repo: &Repository, hash: Option<&Hash>) -> Result<Vec<u8>> {
    match hash {
        Some(hash) => blob::read_blob(repo, hash),
        None => Ok(Vec::new()),
    }
}

fn target_set(paths: &[String]) -> BTreeSet<String> {
    paths.iter().cloned().collect()
}

fn skipped(targets: &BTreeSet<String>, path: &str) -> bool {
    !targets.is_empty() && !targets.contains(path)
}

/// LCS line diff
///
/// `dp[i][j]` is the LCS length of `a[i..]` and `b[j..]`, filled backward;
/// ties prefer the delete branch, so removals are emitted before the
/// additions that replace them. No hunk headers, no context collapsing.
///
/// # Example
///
/// ```
/// use arbor::commands::diff::{lcs_diff, LineKind};
///
/// let a = vec!["one".to_string(), "two".to_string()];
/// let b = vec!["one".to_string(), "2".to_string()];
///
/// let diff = lcs_diff(&a, &b);
/// let kinds: Vec<LineKind> = diff.iter().map(|l| l.kind).collect();
/// assert_eq!(
///     kinds,
///     vec![LineKind::Equal, LineKind::Remove, LineKind::Add]
/// );
/// ```
pub fn lcs_diff(a: &[String], b: &[String]) -> Vec<DiffLine> {
    let n = a.len();
    let m = b.len();

    let mut dp = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            dp[i][j] = if a[i] == b[j] {
                dp[i + 1][j + 1] + 1
            } else if dp[i + 1][j] >= dp[i][j + 1] {
                dp[i + 1][j]
            } else {
                dp[i][j + 1]
            };
        }
    }

    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n || j < m {
        if i < n && j < m && a[i] == b[j] {
            out.push(DiffLine {
                kind: LineKind::Equal,
                text: a[i].clone(),
            });
            i += 1;
            j += 1;
        } else if j == m || (i < n && dp[i + 1][j] >= dp[i][j + 1]) {
            out.push(DiffLine {
                kind: LineKind::Remove,
                text: a[i].clone(),
            });
            i += 1;
        } else {
            out.push(DiffLine {
                kind: LineKind::Add,
                text: b[j].clone(),
            });
            j += 1;
        }
    }

    out
}
