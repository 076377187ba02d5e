//! # Blob Objects
//!
//! A blob stores file contents: raw bytes with no name or metadata.
//!
//! ## Format
//!
//! ```text
//! blob <size>\0<content>
//! ```

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::objects::{self, ObjectKind};
use crate::Repository;

/// How many leading payload bytes the binary heuristic inspects.
const BINARY_SNIFF_LEN: usize = 8192;

/// Compute the blob hash of raw bytes without storing them
///
/// # Example
///
/// ```
/// use arbor::objects::blob::hash_blob;
///
/// // verifiable with: echo "test content" | git hash-object --stdin
/// let hash = hash_blob(b"test content\n");
/// assert_eq!(hash.as_str(), "d670460b4b4aece5915caf5c68d12f560a9fe3e4");
/// ```
pub fn hash_blob(data: &[u8]) -> Hash {
    objects::hash_object(ObjectKind::Blob, data)
}

/// Store raw bytes as a blob and return the hash
pub fn write_blob(repo: &Repository, data: &[u8]) -> Result<Hash> {
    objects::write_object(repo, ObjectKind::Blob, data)
}

/// Read a blob's payload
///
/// Fails with [`Error::WrongKind`] if the hash names a tree or commit.
pub fn read_blob(repo: &Repository, hash: &Hash) -> Result<Vec<u8>> {
    let (kind, payload) = objects::read_object(repo, hash)?;
    if kind != ObjectKind::Blob {
        return Err(Error::WrongKind {
            hash: hash.to_string(),
            expected: "blob",
        });
    }
    Ok(payload)
}

/// Split content on `\n` into owned lines
///
/// A trailing newline does not produce an empty final line; CR is an
/// ordinary content byte. Non-UTF-8 sequences are replaced lossily.
pub fn split_lines(data: &[u8]) -> Vec<String> {
    if data.is_empty() {
        return Vec::new();
    }

    let text = String::from_utf8_lossy(data);
    let mut lines: Vec<String> = text.split('\n').map(|s| s.to_string()).collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Binary detection heuristic: a NUL byte within the first 8 KiB
pub fn is_binary(data: &[u8]) -> bool {
    data.iter().take(BINARY_SNIFF_LEN).any(|&b| b == 0)
}
