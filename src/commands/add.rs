//! # Add Command
//!
//! Stage files for the next commit. Arguments may be files, directories
//! (walked recursively, `.arbor` excluded) or glob patterns.
//!
//! ## Usage
//!
//! ```bash
//! # Stage a single file
//! arbor add file.txt
//!
//! # Stage everything
//! arbor add .
//!
//! # Stage by pattern
//! arbor add 'src/*.rs'
//!
//! # Also stage tracked files that were deleted on disk
//! arbor add -d .
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::index::Index;
use crate::objects::blob;
use crate::Repository;

/// One index mutation performed by `add`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedChange {
    /// `/`-separated repository path
    pub path: String,
    /// Blob hash for additions, `None` for deletions
    pub hash: Option<Hash>,
    pub deleted: bool,
}

/// Stage the given paths; with `deletions`, also stage missing tracked files
///
/// Returns the effective changes in path order. Paths whose staged hash is
/// unchanged produce no entry. The index is persisted once at the end.
///
/// # Arguments
///
/// * `inputs` - Files, directories or glob patterns, relative to the
///   repository root (absolute paths inside the worktree also work)
/// * `deletions` - Stage index entries whose files disappeared as removals
///
/// # Example
///
/// ```no_run
/// use arbor::{commands::add, Repository};
///
/// let repo = Repository::find().unwrap();
///
/// // Stage one file
/// add::run(&repo, &["file.txt".to_string()], false).unwrap();
///
/// // Stage everything, including deletions
/// add::run(&repo, &[".".to_string()], true).unwrap();
/// ```
pub fn run(repo: &Repository, inputs: &[String], deletions: bool) -> Result<Vec<StagedChange>> {
    let mut index = Index::load(repo)?;
    let mut changes: BTreeMap<String, StagedChange> = BTreeMap::new();

    for input in inputs {
        if input.contains(['*', '?', '[', ']']) {
            stage_glob(repo, &mut index, &mut changes, input)?;
        } else {
            let path = resolve_input(repo, input);
            if !path.exists() {
                return Err(Error::NotFound(format!("path {}", input)));
            }
            stage_path(repo, &mut index, &mut changes, &path)?;
        }
    }

    if deletions {
        stage_deletions(repo, &mut index, &mut changes)?;
    }

    index.save(repo)?;
    Ok(changes.into_values().collect())
}

fn resolve_input(repo: &Repository, input: &str) -> PathBuf {
    let path = Path::new(input);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        repo.root.join(path)
    }
}

fn stage_glob(
    repo: &Repository,
    index: &mut Index,
    changes: &mut BTreeMap<String, StagedChange>,
    pattern: &str,
) -> Result<()> {
    let full_pattern = resolve_input(repo, pattern);
    let full_pattern = full_pattern
        .to_str()
        .ok_or_else(|| Error::InvalidPath(pattern.to_string()))?;

    let matches =
        glob::glob(full_pattern).map_err(|_| Error::InvalidPath(pattern.to_string()))?;

    for entry in matches {
        let path = entry.map_err(|e| Error::io(e.path().to_path_buf(), e.into_error()))?;
        stage_path(repo, index, changes, &path)?;
    }

    Ok(())
}

fn stage_path(
    repo: &Repository,
    index: &mut Index,
    changes: &mut BTreeMap<String, StagedChange>,
    path: &Path,
) -> Result<()> {
    if path.is_dir() {
        for entry in WalkDir::new(path)
            .into_iter()
            .filter_entry(|e| e.file_name() != crate::ARBOR_DIR)
        {
            let entry = entry.map_err(|e| {
                let io = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("walk failed"));
                Error::io(path, io)
            })?;

            if entry.file_type().is_file() {
                stage_file(repo, index, changes, entry.path())?;
            }
        }
        return Ok(());
    }

    stage_file(repo, index, changes, path)
}

fn stage_file(
    repo: &Repository,
    index: &mut Index,
    changes: &mut BTreeMap<String, StagedChange>,
    path: &Path,
) -> Result<()> {
    // .arbor internals and paths outside the worktree are never staged
    let key = match repo.index_key(path) {
        Some(key) => key,
        None => return Ok(()),
    };

    // names with spaces cannot round-trip the tree format
    if key.contains(' ') {
        return Err(Error::InvalidPath(key));
    }

    let data = fs::read(path).map_err(|e| Error::io(path, e))?;
    let hash = blob::write_blob(repo, &data)?;

    // unchanged entries are no-ops
    if index.get(&key).is_some_and(|entry| entry.hash == hash) {
        return Ok(());
    }

    index.add_entry(key.clone(), hash.clone(), blob::is_binary(&data));
    changes.insert(
        key.clone(),
        StagedChange {
            path: key,
            hash: Some(hash),
            deleted: false,
        },
    );

    Ok(())
}

fn stage_deletions(
    repo: &Repository,
    index: &mut Index,
    changes: &mut BTreeMap<String, StagedChange>,
) -> Result<()> {
    let missing: Vec<String> = index
        .paths()
        .filter(|path| !repo.work_path(path).exists())
        .cloned()
        .collect();

    for path in missing {
        index.remove_entry(&path);
        changes.insert(
            path.clone(),
            StagedChange {
                path,
                hash: None,
                deleted: true,
            },
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(repo: &Repository, rel: &str, data: &str) {
        let path = repo.work_path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }

    #[test]
    fn test_add_single_file() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        write(&repo, "a.txt", "hello\n");

        let changes = run(&repo, &["a.txt".to_string()], false).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "a.txt");
        assert!(!changes[0].deleted);

        let index = Index::load(&repo).unwrap();
        assert_eq!(
            index.get("a.txt").unwrap().hash,
            blob::hash_blob(b"hello\n")
        );
    }

    #[test]
    fn test_add_unchanged_file_is_noop() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        write(&repo, "a.txt", "hello\n");

        run(&repo, &["a.txt".to_string()], false).unwrap();
        let changes = run(&repo, &["a.txt".to_string()], false).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn test_add_directory_recurses_and_skips_arbor() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        write(&repo, "a.txt", "a\n");
        write(&repo, "src/lib.rs", "lib\n");
        write(&repo, "src/nested/mod.rs", "mod\n");

        let changes = run(&repo, &[".".to_string()], false).unwrap();
        let paths: Vec<&str> = changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["a.txt", "src/lib.rs", "src/nested/mod.rs"]);

        let index = Index::load(&repo).unwrap();
        assert!(!index.paths().any(|p| p.starts_with(".arbor")));
    }

    #[test]
    fn test_add_glob() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        write(&repo, "one.rs", "1\n");
        write(&repo, "two.rs", "2\n");
        write(&repo, "three.txt", "3\n");

        let changes = run(&repo, &["*.rs".to_string()], false).unwrap();
        let paths: Vec<&str> = changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["one.rs", "two.rs"]);
    }

    #[test]
    fn test_add_missing_path_fails() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        assert!(matches!(
            run(&repo, &["ghost.txt".to_string()], false),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_path_with_space_is_rejected() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        write(&repo, "bad name.txt", "x\n");

        assert!(matches!(
            run(&repo, &["bad name.txt".to_string()], false),
            Err(Error::InvalidPath(_))
        ));
    }

    #[test]
    fn test_stage_deletions() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        write(&repo, "a.txt", "a\n");
        write(&repo, "b.txt", "b\n");
        run(&repo, &[".".to_string()], false).unwrap();

        fs::remove_file(repo.work_path("a.txt")).unwrap();

        // without -d the disappearance is not staged
        let changes = run(&repo, &["b.txt".to_string()], false).unwrap();
        assert!(changes.is_empty());
        assert!(Index::load(&repo).unwrap().contains("a.txt"));

        let changes = run(&repo, &["b.txt".to_string()], true).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "a.txt");
        assert!(changes[0].deleted);
        assert!(changes[0].hash.is_none());
        assert!(!Index::load(&repo).unwrap().contains("a.txt"));
    }

    #[test]
    fn test_modified_file_restaged() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        write(&repo, "a.txt", "v1\n");
        run(&repo, &["a.txt".to_string()], false).unwrap();

        write(&repo, "a.txt", "v2\n");
        let changes = run(&repo, &["a.txt".to_string()], false).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].hash, Some(blob::hash_blob(b"v2\n")));
    }

    #[test]
    fn test_binary_flag_is_detected() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        let path = repo.work_path("blob.bin");
        fs::write(&path, b"\x00\x01\x02").unwrap();
        run(&repo, &["blob.bin".to_string()], false).unwrap();

        assert!(Index::load(&repo).unwrap().get("blob.bin").unwrap().is_binary);
    }
}
