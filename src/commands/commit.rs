//! # Commit Command
//!
//! Snapshot the index: fold it into nested trees, wrap the root tree in a
//! commit object and advance the current ref.

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::index::Index;
use crate::objects::{commit, tree};
use crate::refs;
use crate::Repository;

/// Commit the staged snapshot with `message`
///
/// The parent is whatever the current ref resolves to; on the first commit
/// there is none. Writes are ordered blobs, then trees, then the commit,
/// then the ref advance, so an interruption can only leave unreferenced
/// objects behind.
///
/// # Example
///
/// ```no_run
/// use arbor::{commands::commit, Repository};
///
/// let repo = Repository::find().unwrap();
/// let hash = commit::run(&repo, "initial import").unwrap();
/// println!("committed {}", hash);
/// ```
pub fn run(repo: &Repository, message: &str) -> Result<Hash> {
    if message.trim().is_empty() {
        return Err(Error::EmptyMessage);
    }

    let index = Index::load(repo)?;
    let tree_hash = tree::write_from_map(repo, &index.hash_map())?;

    let parent = refs::resolve_head(repo)?;
    let commit_hash = commit::write_commit(repo, &tree_hash, parent.as_ref(), message)?;

    refs::advance_current(repo, &commit_hash)?;
    Ok(commit_hash)
}
