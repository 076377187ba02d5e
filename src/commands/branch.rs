//! # Branch Command
//!
//! Create branches and list them.
//!
//! ## Usage
//!
//! ```bash
//! # Create a branch at the current commit
//! arbor branch create feature
//!
//! # List branches; the current one is marked with *
//! arbor branch list
//! ```

use crate::error::{Error, Result};
use crate::refs;
use crate::Repository;

/// A branch as shown by `branch list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub is_current: bool,
}

/// Create a branch pointing at the current commit
///
/// Fails with [`Error::NotFound`] before the first commit: there is nothing
/// for the new ref to point at yet.
pub fn create(repo: &Repository, name: &str) -> Result<()> {
    let hash = refs::resolve_head(repo)?
        .ok_or_else(|| Error::NotFound("no commits yet".to_string()))?;

    refs::create_ref(repo, name, &hash)
}

/// List branches sorted by name, marking the current one
pub fn list(repo: &Repository) -> Result<Vec<Branch>> {
    let current = refs::current_branch(repo)?;

    Ok(refs::list_refs(repo)?
        .into_iter()
        .map(|name| {
            let is_current = current.as_deref() == Some(name.as_str());
            Branch { name, is_current }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{add, commit as commit_cmd};
    use tempfile::tempdir;

    fn commit_something(repo: &Repository) {
        std::fs::write(repo.work_path("a.txt"), "x\n").unwrap();
        add::run(repo, &["a.txt".to_string()], false).unwrap();
        commit_cmd::run(repo, "first").unwrap();
    }

    #[test]
    fn test_create_before_first_commit_fails() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        assert!(matches!(create(&repo, "feature"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_create_and_list() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        commit_something(&repo);

        create(&repo, "feature").unwrap();

        let branches = list(&repo).unwrap();
        assert_eq!(
            branches,
            vec![
                Branch {
                    name: "feature".to_string(),
                    is_current: false
                },
                Branch {
                    name: "main".to_string(),
                    is_current: true
                },
            ]
        );

        // the new branch points at the same commit as main
        assert_eq!(
            refs::resolve_ref(&repo, "feature").unwrap(),
            refs::resolve_ref(&repo, "main").unwrap()
        );
    }

    #[test]
    fn test_duplicate_create_fails() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        commit_something(&repo);

        create(&repo, "feature").unwrap();
        assert!(matches!(
            create(&repo, "feature"),
            Err(Error::RefExists(_))
        ));
    }

    #[test]
    fn test_slash_in_name_rejected() {
        let temp = tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        commit_something(&repo);

        assert!(matches!(
            create(&repo, "feat/one"),
            Err(Error::InvalidRefName(_))
        ));
    }
}
