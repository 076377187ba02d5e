//! # Arbor - A Content-Addressed Version Control Engine
//!
//! Arbor persists a history of project snapshots as a DAG of immutable
//! objects on disk, tracks a mutable staging area (the index), and can
//! materialize any snapshot back into the filesystem.
//!
//! ## Architecture Overview
//!
//! Everything is built on a content-addressable object store: each piece of
//! data is stored once, named by the SHA-1 hash of its typed payload.
//!
//! ### Object Types
//!
//! - **Blob**: Raw file contents
//! - **Tree**: Directory listing (maps names to blob/tree hashes)
//! - **Commit**: Snapshot with metadata (author, message, parent, tree hash)
//!
//! ### Repository Structure
//!
//! ```text
//! .arbor/
//! ├── HEAD            # Points to current branch (e.g., "refs/heads/main")
//! ├── objects/        # Object database
//! │   ├── ab/         # First 2 chars of hash
//! │   │   └── cdef... # Remaining hash chars, stored uncompressed
//! │   └── ...
//! ├── refs/
//! │   └── heads/      # Branch pointers
//! │       └── main    # Contains commit hash
//! └── index           # Staging area (JSON)
//! ```
//!
//! ## Usage Example
//!
//! ```bash
//! # Initialize a new repository
//! arbor init
//!
//! # Stage a file and commit it
//! arbor add README.md
//! arbor commit -m "first"
//! ```

pub mod commands;
pub mod error;
pub mod hash;
pub mod index;
pub mod objects;
pub mod refs;
pub mod worktree;

use std::path::{Path, PathBuf};

pub use error::{Error, Result};
pub use hash::Hash;

/// The name of the arbor directory (like .git)
pub const ARBOR_DIR: &str = ".arbor";

/// Represents an arbor repository
///
/// The handle carries the worktree root and the derived `.arbor` paths.
/// All core operations take a `&Repository` rather than consulting any
/// process-wide state.
#[derive(Debug, Clone)]
pub struct Repository {
    /// The root directory of the repository (where .arbor lives)
    pub root: PathBuf,
    /// The .arbor directory path
    pub arbor_dir: PathBuf,
}

impl Repository {
    /// Find the repository root by walking up from the current directory
    ///
    /// # Example
    ///
    /// ```no_run
    /// use arbor::Repository;
    ///
    /// let repo = Repository::find().expect("Not in an arbor repository");
    /// println!("Repository root: {:?}", repo.root);
    /// ```
    pub fn find() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| Error::io(".", e))?;
        Self::find_from(&current_dir)
    }

    /// Find repository starting from a specific path
    pub fn find_from(start: &Path) -> Result<Self> {
        let mut current = start.to_path_buf();

        loop {
            let arbor_dir = current.join(ARBOR_DIR);
            if arbor_dir.is_dir() {
                return Ok(Self {
                    root: current,
                    arbor_dir,
                });
            }

            if !current.pop() {
                return Err(Error::NotARepo);
            }
        }
    }

    /// Open the repository rooted exactly at `path`
    ///
    /// Unlike [`Repository::find_from`] this does not walk up; it fails with
    /// [`Error::NotARepo`] unless `path/.arbor` exists.
    pub fn open(path: &Path) -> Result<Self> {
        let arbor_dir = path.join(ARBOR_DIR);
        if !arbor_dir.is_dir() {
            return Err(Error::NotARepo);
        }
        Ok(Self {
            root: path.to_path_buf(),
            arbor_dir,
        })
    }

    /// Initialize a new repository at the given path
    ///
    /// Creates the `.arbor` directory structure:
    /// - `.arbor/objects/` - Object database
    /// - `.arbor/refs/heads/` - Branch references
    /// - `.arbor/HEAD` - Current branch pointer, initially `refs/heads/main`
    ///
    /// The index is created lazily on first `add`. Re-initializing an
    /// existing repository is a no-op.
    pub fn init(path: &Path) -> Result<Self> {
        let root = path.to_path_buf();
        let arbor_dir = root.join(ARBOR_DIR);

        if !arbor_dir.exists() {
            for dir in [
                arbor_dir.clone(),
                arbor_dir.join("objects"),
                arbor_dir.join("refs"),
                arbor_dir.join("refs").join("heads"),
            ] {
                std::fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
            }

            let head = arbor_dir.join("HEAD");
            std::fs::write(&head, "refs/heads/main\n").map_err(|e| Error::io(&head, e))?;
        }

        Ok(Self { root, arbor_dir })
    }

    /// Get the path to the objects directory
    pub fn objects_dir(&self) -> PathBuf {
        self.arbor_dir.join("objects")
    }

    /// Get the path to the refs/heads directory
    pub fn heads_dir(&self) -> PathBuf {
        self.arbor_dir.join("refs").join("heads")
    }

    /// Get the path to the HEAD file
    pub fn head_path(&self) -> PathBuf {
        self.arbor_dir.join("HEAD")
    }

    /// Get the path to the index file
    pub fn index_path(&self) -> PathBuf {
        self.arbor_dir.join("index")
    }

    /// Map a `/`-separated index path to a filesystem path under the root
    ///
    /// Index keys always use `/`; conversion to the host separator happens
    /// only here, at the filesystem boundary.
    pub fn work_path(&self, rel: &str) -> PathBuf {
        let mut path = self.root.clone();
        for part in rel.split('/') {
            path.push(part);
        }
        path
    }

    /// Compute the `/`-separated index key for a file under the root
    ///
    /// Returns `None` for paths outside the worktree or inside `.arbor`.
    pub fn index_key(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let mut parts = Vec::new();
        for comp in rel.components() {
            parts.push(comp.as_os_str().to_str()?.to_string());
        }
        if parts.is_empty() || parts[0] == ARBOR_DIR {
            return None;
        }
        Some(parts.join("/"))
    }
}
