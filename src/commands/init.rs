//! # Init Command
//!
//! Create the `.arbor` skeleton with HEAD pointing at `refs/heads/main`.

use std::path::Path;

use crate::error::Result;
use crate::Repository;

/// Outcome of `init`, distinguishing a fresh repository from a re-run
#[derive(Debug, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    AlreadyExists,
}

/// Initialize a repository at `path`
pub fn run(path: &Path) -> Result<(Repository, InitOutcome)> {
    let existed = path.join(crate::ARBOR_DIR).is_dir();
    let repo = Repository::init(path)?;

    let outcome = if existed {
        InitOutcome::AlreadyExists
    } else {
        InitOutcome::Created
    };

    Ok((repo, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_then_reinit() {
        let temp = tempdir().unwrap();

        let (_, first) = run(temp.path()).unwrap();
        assert_eq!(first, InitOutcome::Created);

        let (_, second) = run(temp.path()).unwrap();
        assert_eq!(second, InitOutcome::AlreadyExists);
    }
}
