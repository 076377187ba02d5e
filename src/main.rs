//! Command-line interface for the arbor engine.
//!
//! The binary parses arguments, locates the repository, calls the library
//! and renders the structured results. Every error from the core maps to
//! exit code 1; a conflicted merge is a success.

use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};

use arbor::commands::{self, add, branch, checkout, diff, init, log, merge, status};
use arbor::Repository;

/// Arbor - a content-addressed version control engine
#[derive(Parser)]
#[command(name = "arbor")]
#[command(version = "0.1.0")]
#[command(about = "A simple version control system", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new arbor repository
    ///
    /// Creates the .arbor directory structure with:
    /// - objects/ (object database)
    /// - refs/heads/ (branch references)
    /// - HEAD (current branch pointer)
    Init,

    /// Add file contents to the staging area
    ///
    /// Arguments may be files, directories (walked recursively) or glob
    /// patterns.
    Add {
        /// Files, directories or glob patterns to stage
        #[arg(required = true)]
        paths: Vec<String>,

        /// Also stage tracked files that were deleted on disk
        #[arg(short = 'd', long)]
        deletions: bool,
    },

    /// Record changes to the repository
    ///
    /// Creates a new commit from the staging area (index).
    Commit {
        /// The commit message
        #[arg(short, long)]
        message: String,
    },

    /// Show commit logs
    ///
    /// Walks the parent chain newest-first and pages the output.
    Log {
        /// Start from this commit instead of HEAD
        #[arg(long)]
        from: Option<String>,

        /// Maximum commits to show
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=100))]
        limit: u32,
    },

    /// Show the working tree status
    ///
    /// Displays staged, unstaged, and untracked files.
    Status,

    /// Show changes between commits, index, and working directory
    Diff {
        /// Two commits to compare (default: working tree vs index)
        #[arg(num_args = 0..=2)]
        commits: Vec<String>,

        /// Show staged changes (index vs HEAD)
        #[arg(long)]
        staged: bool,

        /// Limit output to these paths
        #[arg(long, num_args = 1..)]
        paths: Vec<String>,
    },

    /// Checkout a branch or commit
    ///
    /// A branch name keeps HEAD symbolic; a commit hash detaches it.
    Checkout {
        /// Branch name or commit hash
        target: String,
    },

    /// Branch operations
    Branch {
        #[command(subcommand)]
        command: BranchCommands,
    },

    /// Merge a branch into the current branch
    Merge {
        /// The branch to merge in
        branch: String,
    },
}

#[derive(Subcommand)]
enum BranchCommands {
    /// Create a new branch at the current commit
    Create {
        /// Name of the new branch
        name: String,
    },

    /// List all branches
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init => {
            let (repo, outcome) = init::run(Path::new("."))?;
            match outcome {
                init::InitOutcome::Created => {
                    println!(
                        "Initialized empty arbor repository in {}",
                        repo.arbor_dir.display()
                    );
                }
                init::InitOutcome::AlreadyExists => {
                    println!(
                        "Existing arbor repository in {}",
                        repo.arbor_dir.display()
                    );
                }
            }
        }

        Commands::Add { paths, deletions } => {
            let repo = Repository::find()?;
            let changes = add::run(&repo, paths, *deletions)?;

            if changes.is_empty() {
                println!("Nothing pending!");
            }
            for change in changes {
                if change.deleted {
                    println!("Removed {}", change.path);
                } else if let Some(hash) = change.hash {
                    println!("Added {} with hash {}", change.path, hash);
                }
            }
        }

        Commands::Commit { message } => {
            let repo = Repository::find()?;
            let hash = commands::commit::run(&repo, message)?;
            println!("Committed with hash: {}", hash);
        }

        Commands::Log { from, limit } => {
            let repo = Repository::find()?;
            let page = log::run(&repo, from.as_deref(), *limit as usize)?;

            if page.entries.is_empty() {
                println!("No commits yet.");
            }

            for entry in &page.entries {
                println!("commit {}", entry.hash);
                println!("Author: {} <{}>", entry.author, entry.email);
                println!("Date:   {} +0000", entry.timestamp);
                println!();
                for line in entry.message.lines() {
                    println!("    {}", line);
                }
                println!();
            }

            if let Some(next) = &page.next {
                println!("More history available: arbor log --from {}", next);
            }
        }

        Commands::Status => {
            let repo = Repository::find()?;
            let report = status::run(&repo)?;
            print_status(&report);
        }

        Commands::Diff {
            commits,
            staged,
            paths,
        } => {
            let repo = Repository::find()?;

            if commits.len() == 2 {
                let results = diff::commits(&repo, &commits[0], &commits[1], paths)?;
                print_diffs(&format!("commit {} -> {}", commits[0], commits[1]), &results);
            } else if *staged {
                let results = diff::index_vs_head(&repo, paths)?;
                print_diffs("index vs HEAD", &results);
            } else {
                let results = diff::worktree_vs_index(&repo, paths)?;
                print_diffs("workdir vs index", &results);
            }
        }

        Commands::Checkout { target } => {
            let repo = Repository::find()?;
            match checkout::run(&repo, target)? {
                checkout::CheckoutOutcome::Branch(name) => {
                    println!("Checked out to {}", name);
                }
                checkout::CheckoutOutcome::Detached(hash) => {
                    println!("Checked out to {} (detached HEAD)", hash.short(7));
                }
            }
        }

        Commands::Branch { command } => {
            let repo = Repository::find()?;
            match command {
                BranchCommands::Create { name } => {
                    branch::create(&repo, name)?;
                    println!("Created branch {}", name);
                }
                BranchCommands::List => {
                    println!("Branches:");
                    for branch in branch::list(&repo)? {
                        if branch.is_current {
                            println!(" * {}", branch.name);
                        } else {
                            println!("   {}", branch.name);
                        }
                    }
                }
            }
        }

        Commands::Merge { branch } => {
            let repo = Repository::find()?;
            let outcome = merge::run(&repo, branch)?;
            print_merge(&outcome);
        }
    }

    Ok(())
}

fn print_status(report: &status::StatusReport) {
    match &report.branch {
        Some(branch) => println!("On branch {}", branch),
        None => println!("HEAD detached"),
    }
    println!();

    if report.is_clean() {
        println!("nothing to commit, working tree clean");
        return;
    }

    if !report.to_be_committed.is_empty() {
        println!("Changes to be committed:");
        println!();
        for entry in &report.to_be_committed {
            println!("        {}{}", status_label(entry.kind), entry.path);
        }
        println!();
    }

    if !report.not_staged.is_empty() {
        println!("Changes not staged for commit:");
        println!("  (use \"arbor add <file>...\" to update what will be committed)");
        println!();
        for entry in &report.not_staged {
            println!("        {}{}", status_label(entry.kind), entry.path);
        }
        println!();
    }

    if !report.untracked.is_empty() {
        println!("Untracked files:");
        println!("  (use \"arbor add <file>...\" to include in what will be committed)");
        println!();
        for path in &report.untracked {
            println!("        {}", path);
        }
        println!();
    }
}

fn status_label(kind: status::ChangeKind) -> &'static str {
    match kind {
        status::ChangeKind::New => "new file:   ",
        status::ChangeKind::Modified => "modified:   ",
        status::ChangeKind::Deleted => "deleted:    ",
    }
}

fn print_diffs(mode: &str, results: &[diff::FileDiff]) {
    for result in results {
        println!("diff -- a/{} b/{} ({})", result.path, result.path, mode);
        match (&result.a_hash, &result.b_hash) {
            (Some(a), Some(b)) => println!("index -- {} vs {}", a, b),
            (Some(a), None) => println!("index -- {}", a),
            (None, Some(b)) => println!("index -- {}", b),
            (None, None) => {}
        }

        match &result.lines {
            None => println!("Binary files differ"),
            Some(lines) => {
                for line in lines {
                    println!("{}{}", line.kind.marker(), line.text);
                }
            }
        }
        println!();
    }
}

fn print_merge(outcome: &merge::MergeOutcome) {
    match outcome.kind {
        merge::MergeKind::FastForward => {
            println!(
                "Fast-forward merge of '{}' into '{}'",
                outcome.source, outcome.target
            );
            if let Some(hash) = &outcome.commit {
                println!("Now at {}", hash);
            }
        }
        merge::MergeKind::ThreeWay => {
            if outcome.has_conflicts() {
                for path in &outcome.conflicts {
                    println!("CONFLICT (content): {}", path);
                }
                println!("Automatic merge failed; fix conflicts and then commit the result.");
            } else {
                println!(
                    "Merge made by the 3-way strategy: '{}' into '{}'",
                    outcome.source, outcome.target
                );
                if let Some(hash) = &outcome.commit {
                    println!("Committed with hash: {}", hash);
                }
            }
        }
    }
}
