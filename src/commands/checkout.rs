//! # Checkout Command
//!
//! Restore a snapshot into the worktree and repoint HEAD. A branch name
//! keeps HEAD symbolic; a raw commit hash detaches it.
//!
//! ## Usage
//!
//! ```bash
//! # Switch to a branch
//! arbor checkout feature
//!
//! # Inspect an old commit (detached HEAD)
//! arbor checkout <commit-hash>
//! ```

use crate::error::Result;
use crate::hash::Hash;
use crate::refs;
use crate::worktree;
use crate::Repository;

/// Where HEAD ended up after checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// HEAD is symbolic, on the named branch
    Branch(String),
    /// HEAD holds a bare commit hash
    Detached(Hash),
}

/// Check out a branch name or commit hash
///
/// Requires a clean worktree; the restore fails before touching any file
/// otherwise. The target of a name that is not an existing branch must
/// parse as a full hash.
pub fn run(repo: &Repository, target: &str) -> Result<CheckoutOutcome> {
    if refs::ref_exists(repo, target) {
        let commit_hash = refs::resolve_ref(repo, target)?;
        worktree::restore_commit(repo, &commit_hash)?;
        refs::set_head_to_branch(repo, target)?;
        return Ok(CheckoutOutcome::Branch(target.to_string()));
    }

    let commit_hash = Hash::from_hex(target)?;
    worktree::restore_commit(repo, &commit_hash)?;
    refs::set_head_detached(repo, &commit_hash)?;
    Ok(CheckoutOutcome::Detached(commit_hash))
}
