//! # Log Command
//!
//! Walk the parent chain and page through history.
//!
//! ## Usage
//!
//! ```bash
//! # Latest commits on the current branch (5 by default)
//! arbor log
//!
//! # Continue from where the previous page stopped
//! arbor log --from <hash> --limit 20
//! ```

use crate::error::Result;
use crate::hash::Hash;
use crate::objects::commit;
use crate::refs;
use crate::Repository;

/// One history entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub hash: Hash,
    pub author: String,
    pub email: String,
    /// Author timestamp, seconds since epoch UTC
    pub timestamp: u64,
    pub message: String,
}

/// A page of history
#[derive(Debug, Clone, Default)]
pub struct LogPage {
    pub entries: Vec<LogEntry>,
    /// The first commit beyond the limit, if the chain continues
    pub next: Option<Hash>,
}

/// Collect up to `limit` commits starting at `from` (or HEAD)
///
/// Returns an empty page when there are no commits yet. The caller
/// guarantees `limit` is within 1..=100 (the CLI enforces the range).
pub fn run(repo: &Repository, from: Option<&str>, limit: usize) -> Result<LogPage> {
    let start = match from {
        Some(hash) => Some(Hash::from_hex(hash)?),
        None => refs::resolve_head(repo)?,
    };

    let mut page = LogPage::default();
    let mut cursor = start;

    while let Some(hash) = cursor {
        if page.entries.len() == limit {
            page.next = Some(hash);
            break;
        }

        let commit = commit::read_commit(repo, &hash)?;
        page.entries.push(LogEntry {
            hash,
            author: commit.author.name,
            email: commit.author.email,
            timestamp: commit.author.timestamp,
            message: commit.message,
        });

        cursor = commit.parent;
    }

    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{add, commit as commit_cmd};
    use tempfile::tempdir;

    fn commit_change(repo: &Repository, content: &str, message: &str) -> Hash {
        std::fs::write(repo.work_path("a.txt"), content).unwrap();
        add::run(repo, &["a.txt".to_string()], false).unwrap();
        commit_cmd::run(repo, message).unwrap()
    }

    #[test]
    fn test_empty_history() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        let page = run(&repo, None, 5).unwrap();
        assert!(page.entries.is_empty());
        assert!(page.next.is_none());
    }

    #[test]
    fn test_walks_newest_first() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        commit_change(&repo, "1\n", "first");
        commit_change(&repo, "2\n", "second");
        let third = commit_change(&repo, "3\n", "third");

        let page = run(&repo, None, 5).unwrap();
        let messages: Vec<&str> = page.entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["third", "second", "first"]);
        assert_eq!(page.entries[0].hash, third);
        assert!(page.next.is_none());
    }

    #[test]
    fn test_limit_reports_next() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        let first = commit_change(&repo, "1\n", "first");
        commit_change(&repo, "2\n", "second");
        commit_change(&repo, "3\n", "third");

        let page = run(&repo, None, 2).unwrap();
        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.next, Some(first.clone()));

        // the next page picks up exactly where the previous ended
        let rest = run(&repo, Some(first.as_str()), 2).unwrap();
        assert_eq!(rest.entries.len(), 1);
        assert_eq!(rest.entries[0].message, "first");
        assert!(rest.next.is_none());
    }

    #[test]
    fn test_from_invalid_hash() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        assert!(run(&repo, Some("not-a-hash"), 5).is_err());
    }
}
