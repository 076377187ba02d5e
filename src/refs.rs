//! # References
//!
//! The HEAD pointer and the branch namespace under `refs/heads/`.
//!
//! HEAD holds either a symbolic reference (`refs/heads/<name>\n`) or a bare
//! commit hash (detached). A branch file holds a commit hash followed by a
//! newline. A ref file exists exactly when a branch of that name exists.

use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::Repository;

/// Read the raw (trimmed) content of HEAD
pub fn read_head(repo: &Repository) -> Result<String> {
    let head_path = repo.head_path();
    let content = fs::read_to_string(&head_path).map_err(|e| Error::io(&head_path, e))?;
    Ok(content.trim().to_string())
}

/// Whether a HEAD value is a symbolic reference
pub fn is_symbolic(head: &str) -> bool {
    head.starts_with("refs/")
}

/// The branch HEAD points at, or `None` when detached
pub fn current_branch(repo: &Repository) -> Result<Option<String>> {
    let head = read_head(repo)?;
    Ok(head
        .strip_prefix("refs/heads/")
        .map(|name| name.to_string()))
}

/// Resolve HEAD to a commit hash
///
/// Returns `None` when HEAD points at a branch that has no commit yet
/// (the pre-first-commit state).
pub fn resolve_head(repo: &Repository) -> Result<Option<Hash>> {
    let head = read_head(repo)?;

    if !is_symbolic(&head) {
        // detached: HEAD holds the hash itself
        return Ok(Some(Hash::from_hex(&head)?));
    }

    let ref_path = repo.arbor_dir.join(&head);
    let content = match fs::read_to_string(&ref_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io(&ref_path, e)),
    };

    Ok(Some(Hash::from_hex(content.trim())?))
}

/// Resolve a branch name to its commit hash
pub fn resolve_ref(repo: &Repository, name: &str) -> Result<Hash> {
    let ref_path = branch_path(repo, name);
    let content = match fs::read_to_string(&ref_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::RefNotFound(name.to_string()));
        }
        Err(e) => return Err(Error::io(&ref_path, e)),
    };
    Hash::from_hex(content.trim())
}

/// Whether a branch of this name exists
pub fn ref_exists(repo: &Repository, name: &str) -> bool {
    branch_path(repo, name).is_file()
}

/// Create a new branch pointing at `hash`
///
/// Branch names may not be empty or contain `/`.
pub fn create_ref(repo: &Repository, name: &str, hash: &Hash) -> Result<()> {
    if name.is_empty() || name.contains('/') {
        return Err(Error::InvalidRefName(name.to_string()));
    }

    let ref_path = branch_path(repo, name);
    if ref_path.exists() {
        return Err(Error::RefExists(name.to_string()));
    }

    write_ref_file(&ref_path, hash)
}

/// Advance whatever HEAD currently points to
///
/// On a branch this moves the branch tip; detached, it rewrites HEAD
/// itself with the new hash.
pub fn advance_current(repo: &Repository, hash: &Hash) -> Result<()> {
    let head = read_head(repo)?;

    if is_symbolic(&head) {
        write_ref_file(&repo.arbor_dir.join(&head), hash)
    } else {
        write_ref_file(&repo.head_path(), hash)
    }
}

/// Point HEAD at a branch
pub fn set_head_to_branch(repo: &Repository, name: &str) -> Result<()> {
    let head_path = repo.head_path();
    fs::write(&head_path, format!("refs/heads/{}\n", name)).map_err(|e| Error::io(&head_path, e))
}

/// Point HEAD directly at a commit (detached)
pub fn set_head_detached(repo: &Repository, hash: &Hash) -> Result<()> {
    write_ref_file(&repo.head_path(), hash)
}

/// List branch names under refs/heads, sorted
pub fn list_refs(repo: &Repository) -> Result<Vec<String>> {
    let heads_dir = repo.heads_dir();
    if !heads_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(&heads_dir).map_err(|e| Error::io(&heads_dir, e))? {
        let entry = entry.map_err(|e| Error::io(&heads_dir, e))?;
        if entry.path().is_file() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }

    names.sort();
    Ok(names)
}

fn branch_path(repo: &Repository, name: &str) -> PathBuf {
    repo.heads_dir().join(name)
}

fn write_ref_file(path: &std::path::Path, hash: &Hash) -> Result<()> {
    fs::write(path, format!("{}\n", hash)).map_err(|e| Error::io(path, e))
}
