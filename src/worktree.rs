//! # Worktree
//!
//! Materializing snapshots into the filesystem and enforcing the
//! clean-worktree precondition that guards destructive operations.

use std::fs;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::index::Index;
use crate::objects::{blob, commit, tree};
use crate::Repository;

/// Verify every tracked file still matches its staged hash
///
/// A missing file or content mismatch fails with [`Error::DirtyWorktree`]
/// naming the offending path. Untracked files are not destructive blockers
/// and are ignored.
pub fn ensure_clean(repo: &Repository) -> Result<()> {
    let index = Index::load(repo)?;

    for (path, entry) in index.iter() {
        let file_path = repo.work_path(path);
        let data = match fs::read(&file_path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::DirtyWorktree(path.clone()));
            }
            Err(e) => return Err(Error::io(&file_path, e)),
        };

        if blob::hash_blob(&data) != entry.hash {
            return Err(Error::DirtyWorktree(path.clone()));
        }
    }

    Ok(())
}

/// Restore the snapshot of a commit into the worktree
///
/// Requires a clean worktree. Writes every blob of the commit's tree to its
/// path, deletes files the index tracks that the tree no longer contains,
/// and rewrites the index to mirror the tree. Files that are neither in the
/// index nor in the tree are left alone.
pub fn restore_commit(repo: &Repository, commit_hash: &Hash) -> Result<()> {
    ensure_clean(repo)?;

    let commit = commit::read_commit(repo, commit_hash)?;
    let tree_map = tree::path_map(repo, &commit.tree)?;

    let mut index = Index::load(repo)?;

    // tracked but absent from the target tree: delete from disk and index
    let stale: Vec<String> = index
        .paths()
        .filter(|path| !tree_map.contains_key(*path))
        .cloned()
        .collect();

    for path in stale {
        let file_path = repo.work_path(&path);
        match fs::remove_file(&file_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(&file_path, e)),
        }
        index.remove_entry(&path);
    }

    // materialize the tree and restage it
    for (path, hash) in &tree_map {
        let data = blob::read_blob(repo, hash)?;

        let file_path = repo.work_path(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::write(&file_path, &data).map_err(|e| Error::io(&file_path, e))?;

        index.add_entry(path.clone(), hash.clone(), blob::is_binary(&data));
    }

    index.save(repo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{add, commit as commit_cmd};
    use tempfile::tempdir;

    fn write(repo: &Repository, rel: &str, data: &str) {
        let path = repo.work_path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }

    fn commit_all(repo: &Repository, message: &str) -> Hash {
        add::run(repo, &[".".to_string()], true).unwrap();
        commit_cmd::run(repo, message).unwrap()
    }

    #[test]
    fn test_clean_after_add() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        write(&repo, "a.txt", "hello\n");
        add::run(&repo, &["a.txt".to_string()], false).unwrap();

        ensure_clean(&repo).unwrap();
    }

    #[test]
    fn test_modified_file_is_dirty() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        write(&repo, "a.txt", "hello\n");
        add::run(&repo, &["a.txt".to_string()], false).unwrap();
        write(&repo, "a.txt", "changed\n");

        assert!(matches!(
            ensure_clean(&repo),
            Err(Error::DirtyWorktree(path)) if path == "a.txt"
        ));
    }

    #[test]
    fn test_missing_tracked_file_is_dirty() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        write(&repo, "a.txt", "hello\n");
        add::run(&repo, &["a.txt".to_string()], false).unwrap();
        fs::remove_file(repo.work_path("a.txt")).unwrap();

        assert!(matches!(ensure_clean(&repo), Err(Error::DirtyWorktree(_))));
    }

    #[test]
    fn test_untracked_files_do_not_block() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        write(&repo, "a.txt", "hello\n");
        add::run(&repo, &["a.txt".to_string()], false).unwrap();
        write(&repo, "scratch.txt", "not tracked\n");

        ensure_clean(&repo).unwrap();
    }

    #[test]
    fn test_restore_earlier_commit() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        write(&repo, "a.txt", "v1\n");
        write(&repo, "sub/b.txt", "b\n");
        let first = commit_all(&repo, "first");

        write(&repo, "a.txt", "v2\n");
        write(&repo, "new.txt", "new\n");
        commit_all(&repo, "second");

        restore_commit(&repo, &first).unwrap();

        assert_eq!(fs::read_to_string(repo.work_path("a.txt")).unwrap(), "v1\n");
        assert_eq!(
            fs::read_to_string(repo.work_path("sub/b.txt")).unwrap(),
            "b\n"
        );
        // new.txt was only in the second tree: deleted and unstaged
        assert!(!repo.work_path("new.txt").exists());

        let index = Index::load(&repo).unwrap();
        assert!(index.contains("a.txt"));
        assert!(!index.contains("new.txt"));
    }

    #[test]
    fn test_restore_refuses_dirty_worktree() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        write(&repo, "a.txt", "v1\n");
        let first = commit_all(&repo, "first");

        write(&repo, "a.txt", "local edit\n");
        assert!(matches!(
            restore_commit(&repo, &first),
            Err(Error::DirtyWorktree(_))
        ));
        // the worktree is left untouched
        assert_eq!(
            fs::read_to_string(repo.work_path("a.txt")).unwrap(),
            "local edit\n"
        );
    }

    #[test]
    fn test_restore_is_idempotent() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        write(&repo, "a.txt", "v1\n");
        let first = commit_all(&repo, "first");
        write(&repo, "a.txt", "v2\n");
        let second = commit_all(&repo, "second");

        restore_commit(&repo, &first).unwrap();
        restore_commit(&repo, &first).unwrap();
        assert_eq!(fs::read_to_string(repo.work_path("a.txt")).unwrap(), "v1\n");

        restore_commit(&repo, &second).unwrap();
        assert_eq!(fs::read_to_string(repo.work_path("a.txt")).unwrap(), "v2\n");
    }
}
