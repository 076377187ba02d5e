//! # Error Types
//!
//! The closed error taxonomy for the engine. Every fallible operation in the
//! library returns [`Result`]; nothing in the core prints or exits. The CLI
//! layer renders errors and maps them to exit code 1.

use std::path::PathBuf;

/// Errors produced by repository operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not an arbor repository (or any of the parent directories): .arbor")]
    NotARepo,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("corrupt object: {0}")]
    CorruptObject(String),

    #[error("invalid hash value: {0:?}")]
    InvalidHash(String),

    #[error("object {hash} is not a {expected}")]
    WrongKind { hash: String, expected: &'static str },

    #[error("working tree has local changes at {0}; commit or restore them first")]
    DirtyWorktree(String),

    #[error("a branch named '{0}' already exists")]
    RefExists(String),

    #[error("branch '{0}' not found")]
    RefNotFound(String),

    #[error("invalid branch name: {0}")]
    InvalidRefName(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("commit message required")]
    EmptyMessage,

    #[error("cannot merge a branch into itself")]
    SameBranch,

    #[error("no common ancestor found")]
    NoCommonAncestor,

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Attach a path to a raw io error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
