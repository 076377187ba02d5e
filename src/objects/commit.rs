//! # Commit Objects
//!
//! A commit pins a tree, links to an optional parent, and carries author
//! metadata plus a message.
//!
//! ## Format
//!
//! ```text
//! tree <tree-hash>
//! parent <parent-hash>     # absent on the root commit
//! author <name> <email> <timestamp> +0000
//! committer <name> <email> <timestamp> +0000
//!
//! <commit message>
//! ```
//!
//! Author and committer are identical and derived from the `USER`
//! environment variable (default `anonymous`); the timezone is always the
//! literal `+0000`.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::objects::{self, ObjectKind};
use crate::Repository;

/// An author/committer identity at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    /// Seconds since the Unix epoch, UTC
    pub timestamp: u64,
}

impl Signature {
    /// The identity of the current user, stamped now
    ///
    /// Name comes from `$USER` (default `anonymous`), email is
    /// `<name>@localhost`.
    pub fn from_env() -> Self {
        let name = std::env::var("USER")
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| "anonymous".to_string());
        let email = format!("{}@localhost", name);

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            name,
            email,
            timestamp,
        }
    }

    /// Serialize as `name <email> timestamp +0000`
    fn serialize(&self) -> String {
        format!("{} <{}> {} +0000", self.name, self.email, self.timestamp)
    }

    /// Parse from `name <email> timestamp +0000`
    fn parse(line: &str) -> Result<Self> {
        let (name, rest) = line
            .split_once(" <")
            .ok_or_else(|| Error::CorruptObject(format!("malformed signature {:?}", line)))?;
        let (email, rest) = rest
            .split_once("> ")
            .ok_or_else(|| Error::CorruptObject(format!("malformed signature {:?}", line)))?;

        let timestamp = rest
            .split(' ')
            .next()
            .and_then(|t| t.parse().ok())
            .unwrap_or(0);

        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
            timestamp,
        })
    }
}

/// Represents a commit object
#[derive(Debug, Clone)]
pub struct Commit {
    /// Hash of the snapshot tree
    pub tree: Hash,
    /// Parent commit; `None` marks a root commit
    pub parent: Option<Hash>,
    pub author: Signature,
    pub committer: Signature,
    /// Message, without the trailing newline
    pub message: String,
}

impl Commit {
    /// Check if this is the initial commit (no parent)
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Build the commit payload
pub fn build_payload(
    tree: &Hash,
    parent: Option<&Hash>,
    signature: &Signature,
    message: &str,
) -> Vec<u8> {
    let mut data = format!("tree {}\n", tree);
    if let Some(parent) = parent {
        data.push_str(&format!("parent {}\n", parent));
    }
    data.push_str(&format!("author {}\n", signature.serialize()));
    data.push_str(&format!("committer {}\n\n", signature.serialize()));
    data.push_str(message);
    data.push('\n');
    data.into_bytes()
}

/// Store a commit object with the current user's identity
pub fn write_commit(
    repo: &Repository,
    tree: &Hash,
    parent: Option<&Hash>,
    message: &str,
) -> Result<Hash> {
    let payload = build_payload(tree, parent, &Signature::from_env(), message);
    objects::write_object(repo, ObjectKind::Commit, &payload)
}

/// Read and parse a commit object
///
/// Fails with [`Error::WrongKind`] if the hash names a blob or tree, and
/// [`Error::CorruptObject`] when the `tree` header is missing.
pub fn read_commit(repo: &Repository, hash: &Hash) -> Result<Commit> {
    let (kind, payload) = objects::read_object(repo, hash)?;
    if kind != ObjectKind::Commit {
        return Err(Error::WrongKind {
            hash: hash.to_string(),
            expected: "commit",
        });
    }

    parse_payload(&payload)
        .map_err(|e| match e {
            Error::CorruptObject(msg) => Error::CorruptObject(format!("commit {}: {}", hash, msg)),
            other => other,
        })
}

fn parse_payload(payload: &[u8]) -> Result<Commit> {
    let text = std::str::from_utf8(payload)
        .map_err(|_| Error::CorruptObject("payload is not utf-8".to_string()))?;

    let (headers, message) = text
        .split_once("\n\n")
        .ok_or_else(|| Error::CorruptObject("missing header/message separator".to_string()))?;

    let mut tree = None;
    let mut parent = None;
    let mut author = None;
    let mut committer = None;

    for line in headers.split('\n') {
        let (key, value) = match line.split_once(' ') {
            Some(kv) => kv,
            None => continue,
        };

        match key {
            "tree" => tree = Some(Hash::from_hex(value)?),
            "parent" => parent = Some(Hash::from_hex(value)?),
            "author" => author = Some(Signature::parse(value)?),
            "committer" => committer = Some(Signature::parse(value)?),
            _ => {}
        }
    }

    let tree = tree.ok_or_else(|| Error::CorruptObject("no tree header".to_string()))?;
    let author = author.ok_or_else(|| Error::CorruptObject("no author header".to_string()))?;
    let committer = committer.unwrap_or_else(|| author.clone());

    Ok(Commit {
        tree,
        parent,
        author,
        committer,
        message: message.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tree_hash() -> Hash {
        Hash::from_hex("4b825dc642cb6eb9a060e54bf8d69288fbee4904").unwrap()
    }

    fn signature() -> Signature {
        Signature {
            name: "test".to_string(),
            email: "test@localhost".to_string(),
            timestamp: 1234567890,
        }
    }

    #[test]
    fn test_payload_layout() {
        let payload = build_payload(&tree_hash(), None, &signature(), "first");
        let text = String::from_utf8(payload).unwrap();
        assert_eq!(
            text,
            "tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904\n\
             author test <test@localhost> 1234567890 +0000\n\
             committer test <test@localhost> 1234567890 +0000\n\
             \n\
             first\n"
        );
    }

    #[test]
    fn test_roundtrip_with_parent() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        let parent = Hash::from_hex("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
        let payload = build_payload(&tree_hash(), Some(&parent), &signature(), "second");
        let hash = objects::write_object(&repo, ObjectKind::Commit, &payload).unwrap();

        let commit = read_commit(&repo, &hash).unwrap();
        assert_eq!(commit.tree, tree_hash());
        assert_eq!(commit.parent, Some(parent));
        assert_eq!(commit.author, signature());
        assert_eq!(commit.committer, signature());
        assert_eq!(commit.message, "second");
        assert!(!commit.is_root());
    }

    #[test]
    fn test_root_commit_has_no_parent() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        let payload = build_payload(&tree_hash(), None, &signature(), "first");
        let hash = objects::write_object(&repo, ObjectKind::Commit, &payload).unwrap();

        let commit = read_commit(&repo, &hash).unwrap();
        assert!(commit.is_root());
    }

    #[test]
    fn test_commit_hash_deterministic_given_fixed_inputs() {
        let a = build_payload(&tree_hash(), None, &signature(), "msg");
        let b = build_payload(&tree_hash(), None, &signature(), "msg");
        assert_eq!(
            objects::hash_object(ObjectKind::Commit, &a),
            objects::hash_object(ObjectKind::Commit, &b)
        );
    }

    #[test]
    fn test_missing_tree_is_corrupt() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        let payload = b"author test <t@localhost> 1 +0000\ncommitter test <t@localhost> 1 +0000\n\nmsg\n";
        let hash = objects::write_object(&repo, ObjectKind::Commit, payload).unwrap();

        assert!(matches!(
            read_commit(&repo, &hash),
            Err(Error::CorruptObject(_))
        ));
    }

    #[test]
    fn test_read_commit_rejects_other_kinds() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        let hash = objects::write_object(&repo, ObjectKind::Blob, b"data").unwrap();
        assert!(matches!(
            read_commit(&repo, &hash),
            Err(Error::WrongKind { expected: "commit", .. })
        ));
    }
}
