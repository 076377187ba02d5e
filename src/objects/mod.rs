//! # Object Store
//!
//! Content-addressed durable store of typed byte objects. Write-once,
//! read-many.
//!
//! ## On-Disk Format
//!
//! Every object is stored uncompressed as:
//! ```text
//! <kind> <size>\0<payload>
//! ```
//!
//! at `objects/<first 2 hash chars>/<remaining 38 chars>`, where the hash is
//! the SHA-1 of those exact file bytes. An object file, once written, is
//! never rewritten: a write whose computed path already exists is suppressed.
//!
//! The store does not enforce kind on write; callers type their reads
//! through the codecs in [`blob`], [`tree`] and [`commit`].

pub mod blob;
pub mod commit;
pub mod tree;

pub use commit::Commit;
pub use tree::{Tree, TreeEntry};

use std::fmt;
use std::fs;

use sha1::{Digest, Sha1};

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::Repository;

/// The three kinds of stored object. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "blob" => Some(ObjectKind::Blob),
            "tree" => Some(ObjectKind::Tree),
            "commit" => Some(ObjectKind::Commit),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute the hash of a payload with its object header, without storing
///
/// # Example
///
/// ```
/// use arbor::objects::{hash_object, ObjectKind};
///
/// let hash = hash_object(ObjectKind::Blob, b"hello\n");
/// assert_eq!(hash.as_str().len(), 40);
/// ```
pub fn hash_object(kind: ObjectKind, payload: &[u8]) -> Hash {
    let header = format!("{} {}\0", kind, payload.len());

    let mut hasher = Sha1::new();
    hasher.update(header.as_bytes());
    hasher.update(payload);

    Hash::from_digest(&hasher.finalize())
}

/// Store an object, returning its hash
///
/// Identical payloads collide to identical files, so a concurrent writer
/// producing the same hash is safe: the second write is suppressed. New
/// files are written to a temp path and renamed into place so a crash never
/// leaves a partial file observable under the final name.
pub fn write_object(repo: &Repository, kind: ObjectKind, payload: &[u8]) -> Result<Hash> {
    let hash = hash_object(kind, payload);

    let dir = repo.objects_dir().join(hash.prefix());
    fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;

    let object_path = dir.join(hash.suffix());
    if object_path.exists() {
        return Ok(hash);
    }

    let mut content = format!("{} {}\0", kind, payload.len()).into_bytes();
    content.extend_from_slice(payload);

    let tmp_path = dir.join(format!("{}.tmp", hash.suffix()));
    fs::write(&tmp_path, &content).map_err(|e| Error::io(&tmp_path, e))?;
    fs::rename(&tmp_path, &object_path).map_err(|e| Error::io(&object_path, e))?;

    Ok(hash)
}

/// Read an object back as its kind and payload
///
/// Fails with [`Error::NotFound`] when the file is absent and
/// [`Error::CorruptObject`] on a malformed header or size mismatch.
pub fn read_object(repo: &Repository, hash: &Hash) -> Result<(ObjectKind, Vec<u8>)> {
    let object_path = repo
        .objects_dir()
        .join(hash.prefix())
        .join(hash.suffix());

    let content = match fs::read(&object_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::NotFound(format!("object {}", hash)));
        }
        Err(e) => return Err(Error::io(&object_path, e)),
    };

    let zero = content
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| Error::CorruptObject(format!("{}: missing header terminator", hash)))?;

    let header = std::str::from_utf8(&content[..zero])
        .map_err(|_| Error::CorruptObject(format!("{}: non-utf8 header", hash)))?;

    let (kind_str, size_str) = header
        .split_once(' ')
        .ok_or_else(|| Error::CorruptObject(format!("{}: malformed header", hash)))?;

    let kind = ObjectKind::parse(kind_str)
        .ok_or_else(|| Error::CorruptObject(format!("{}: unknown kind {:?}", hash, kind_str)))?;

    let size: usize = size_str
        .parse()
        .map_err(|_| Error::CorruptObject(format!("{}: bad size {:?}", hash, size_str)))?;

    let payload = content[zero + 1..].to_vec();
    if payload.len() != size {
        return Err(Error::CorruptObject(format!(
            "{}: size mismatch, header says {} but payload is {}",
            hash,
            size,
            payload.len()
        )));
    }

    Ok((kind, payload))
}
