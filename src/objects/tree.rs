//! # Tree Objects
//!
//! A tree represents a directory: an ordered list of named blob and subtree
//! entries.
//!
//! ## Format
//!
//! One text line per entry, sorted ascending by name:
//!
//! ```text
//! blob <40-hex-hash> <name>\n
//! tree <40-hex-hash> <name>\n
//! ```
//!
//! Name-sorting plus the single serialization make tree hashes canonical:
//! two trees with the same entries always hash the same. Names never
//! contain `/`, and names containing spaces are rejected because they
//! cannot round-trip this format.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::objects::{self, commit, ObjectKind};
use crate::refs;
use crate::Repository;

/// A single entry in a tree object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Blob or subtree (never commit)
    pub kind: ObjectKind,
    /// Hash of the blob or subtree
    pub hash: Hash,
    /// Entry name, without any `/`
    pub name: String,
}

/// Represents a tree object (directory listing)
#[derive(Debug, Clone, Default)]
pub struct Tree {
    /// The entries, sorted ascending by name
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Parse a tree from raw payload bytes
    pub fn parse(content: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(content)
            .map_err(|_| Error::CorruptObject("tree payload is not utf-8".to_string()))?;

        let mut entries = Vec::new();
        for line in text.split('\n') {
            if line.is_empty() {
                continue;
            }

            let mut fields = line.splitn(3, ' ');
            let (kind, hash, name) = match (fields.next(), fields.next(), fields.next()) {
                (Some(k), Some(h), Some(n)) => (k, h, n),
                _ => {
                    return Err(Error::CorruptObject(format!(
                        "malformed tree entry {:?}",
                        line
                    )))
                }
            };

            let kind = match kind {
                "blob" => ObjectKind::Blob,
                "tree" => ObjectKind::Tree,
                other => {
                    return Err(Error::CorruptObject(format!(
                        "invalid tree entry kind {:?}",
                        other
                    )))
                }
            };

            entries.push(TreeEntry {
                kind,
                hash: Hash::from_hex(hash)?,
                name: name.to_string(),
            });
        }

        Ok(Self { entries })
    }

    /// Serialize to the canonical line format
    pub fn serialize(&self) -> Vec<u8> {
        let mut data = Vec::new();
        for entry in &self.entries {
            data.extend_from_slice(
                format!("{} {} {}\n", entry.kind, entry.hash, entry.name).as_bytes(),
            );
        }
        data
    }
}

/// Read a tree object
///
/// Fails with [`Error::WrongKind`] if the hash names a blob or commit.
pub fn read_tree(repo: &Repository, hash: &Hash) -> Result<Tree> {
    let (kind, payload) = objects::read_object(repo, hash)?;
    if kind != ObjectKind::Tree {
        return Err(Error::WrongKind {
            hash: hash.to_string(),
            expected: "tree",
        });
    }
    Tree::parse(&payload)
}

/// Build a tree-of-trees from a flat `/`-separated path map
///
/// Entries sharing a first path segment induce a subdirectory whose subtree
/// is built recursively from the remainder; subtree hashes are written
/// bottom-up. Returns the root tree hash.
pub fn write_from_map(repo: &Repository, entries: &BTreeMap<String, Hash>) -> Result<Hash> {
    write_subtree(repo, entries, "")
}

fn write_subtree(
    repo: &Repository,
    entries: &BTreeMap<String, Hash>,
    prefix: &str,
) -> Result<Hash> {
    let mut files: BTreeMap<&str, &Hash> = BTreeMap::new();
    let mut subdirs: BTreeSet<&str> = BTreeSet::new();

    for (path, hash) in entries {
        let rest = match path.strip_prefix(prefix) {
            Some(rest) if !rest.is_empty() => rest,
            _ => continue,
        };

        match rest.split_once('/') {
            None => {
                files.insert(rest, hash);
            }
            Some((dir, _)) => {
                subdirs.insert(dir);
            }
        }
    }

    let mut names: BTreeSet<&str> = files.keys().copied().collect();
    names.extend(subdirs.iter().copied());

    let mut tree = Tree::default();
    for name in names {
        if name.contains(' ') {
            return Err(Error::InvalidPath(format!("{}{}", prefix, name)));
        }

        if let Some(hash) = files.get(name) {
            tree.entries.push(TreeEntry {
                kind: ObjectKind::Blob,
                hash: (*hash).clone(),
                name: name.to_string(),
            });
            continue;
        }

        let subtree = write_subtree(repo, entries, &format!("{}{}/", prefix, name))?;
        tree.entries.push(TreeEntry {
            kind: ObjectKind::Tree,
            hash: subtree,
            name: name.to_string(),
        });
    }

    objects::write_object(repo, ObjectKind::Tree, &tree.serialize())
}

/// Flatten a tree into a `/`-separated path → blob hash map
pub fn path_map(repo: &Repository, hash: &Hash) -> Result<BTreeMap<String, Hash>> {
    let mut out = BTreeMap::new();
    fill_path_map(repo, hash, "", &mut out)?;
    Ok(out)
}

fn fill_path_map(
    repo: &Repository,
    hash: &Hash,
    prefix: &str,
    out: &mut BTreeMap<String, Hash>,
) -> Result<()> {
    let tree = read_tree(repo, hash)?;

    for entry in tree.entries {
        let full = if prefix.is_empty() {
            entry.name
        } else {
            format!("{}/{}", prefix, entry.name)
        };

        match entry.kind {
            ObjectKind::Blob => {
                out.insert(full, entry.hash);
            }
            ObjectKind::Tree => fill_path_map(repo, &entry.hash, &full, out)?,
            ObjectKind::Commit => unreachable!("tree entries are blob or tree"),
        }
    }

    Ok(())
}

/// Flatten the tree of a commit
pub fn commit_path_map(repo: &Repository, commit_hash: &Hash) -> Result<BTreeMap<String, Hash>> {
    let commit = commit::read_commit(repo, commit_hash)?;
    path_map(repo, &commit.tree)
}

/// Flatten the tree HEAD currently points at
///
/// Returns an empty map when there is no commit yet.
pub fn head_tree_map(repo: &Repository) -> Result<BTreeMap<String, Hash>> {
    match refs::resolve_head(repo)? {
        Some(commit_hash) => commit_path_map(repo, &commit_hash),
        None => Ok(BTreeMap::new()),
    }
}
