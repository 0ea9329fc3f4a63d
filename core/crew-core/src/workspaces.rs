//! Worktree enumeration via git.
//!
//! Git is the ground truth for which workspaces exist. We shell out to
//! `git worktree list --porcelain` and parse its block output; the main
//! worktree is always listed first and is the primary one.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{CrewError, Result};

/// Branch label used when a worktree has no resolvable branch (detached HEAD).
pub const DETACHED_BRANCH: &str = "(detached)";

/// One git worktree as reported by `git worktree list`.
#[derive(Debug, Clone, PartialEq)]
pub struct Worktree {
    pub path: PathBuf,
    pub branch: String,
}

/// The full worktree listing for one project, in git's reported order.
#[derive(Debug, Clone, PartialEq)]
pub struct WorktreeList {
    pub worktrees: Vec<Worktree>,
    /// Path of the main (primary) worktree. `None` only when git reports
    /// no worktrees at all, which does not happen for a managed project.
    pub primary: Option<PathBuf>,
}

/// Lists all worktrees belonging to the project at `project_root`.
///
/// Fails with [`CrewError::NotAProject`] when the directory is not managed by
/// git; that failure is distinguishable from a listing with zero worktrees.
pub fn list_worktrees(project_root: &Path) -> Result<WorktreeList> {
    let output = Command::new("git")
        .args(["worktree", "list", "--porcelain"])
        .current_dir(project_root)
        .output()
        .map_err(|e| CrewError::io("failed to run git worktree list", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(CrewError::NotAProject {
            path: project_root.to_path_buf(),
            details: stderr,
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_worktree_list(&stdout))
}

/// Parses `git worktree list --porcelain` output.
///
/// Blocks are separated by blank lines. Lines we care about:
/// `worktree <path>`, `branch refs/heads/<name>`, `detached`.
/// Other attributes (`HEAD`, `bare`, `locked`, ...) are ignored.
fn parse_worktree_list(output: &str) -> WorktreeList {
    let mut worktrees = Vec::new();

    let mut current_path: Option<PathBuf> = None;
    let mut current_branch: Option<String> = None;

    let mut flush = |path: &mut Option<PathBuf>, branch: &mut Option<String>| {
        if let Some(path) = path.take() {
            worktrees.push(Worktree {
                path,
                branch: branch.take().unwrap_or_else(|| DETACHED_BRANCH.to_string()),
            });
        }
        *branch = None;
    };

    for line in output.lines() {
        if let Some(path) = line.strip_prefix("worktree ") {
            // A new block may start without a preceding blank line.
            flush(&mut current_path, &mut current_branch);
            current_path = Some(PathBuf::from(path));
        } else if let Some(branch) = line.strip_prefix("branch refs/heads/") {
            current_branch = Some(branch.to_string());
        } else if line == "detached" {
            current_branch = None;
        } else if line.is_empty() {
            flush(&mut current_path, &mut current_branch);
        }
    }
    flush(&mut current_path, &mut current_branch);

    let primary = worktrees.first().map(|w| w.path.clone());
    WorktreeList { worktrees, primary }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_worktree() {
        let output = "worktree /repo\nHEAD abc123\nbranch refs/heads/main\n\n";
        let list = parse_worktree_list(output);
        assert_eq!(list.worktrees.len(), 1);
        assert_eq!(list.worktrees[0].path, PathBuf::from("/repo"));
        assert_eq!(list.worktrees[0].branch, "main");
        assert_eq!(list.primary, Some(PathBuf::from("/repo")));
    }

    #[test]
    fn test_parse_multiple_worktrees_preserves_order() {
        let output = "worktree /repo\nHEAD abc\nbranch refs/heads/main\n\n\
                      worktree /repo.worktrees/auth\nHEAD def\nbranch refs/heads/auth\n\n\
                      worktree /repo.worktrees/docs\nHEAD ghi\nbranch refs/heads/docs\n\n";
        let list = parse_worktree_list(output);
        assert_eq!(list.worktrees.len(), 3);
        assert_eq!(list.worktrees[1].path, PathBuf::from("/repo.worktrees/auth"));
        assert_eq!(list.worktrees[2].branch, "docs");
        // Main worktree is listed first.
        assert_eq!(list.primary, Some(PathBuf::from("/repo")));
    }

    #[test]
    fn test_parse_detached_worktree_gets_sentinel() {
        let output = "worktree /repo\nHEAD abc\nbranch refs/heads/main\n\n\
                      worktree /repo.worktrees/spike\nHEAD def\ndetached\n\n";
        let list = parse_worktree_list(output);
        assert_eq!(list.worktrees[1].branch, DETACHED_BRANCH);
    }

    #[test]
    fn test_parse_missing_trailing_blank_line() {
        let output = "worktree /repo\nHEAD abc\nbranch refs/heads/main";
        let list = parse_worktree_list(output);
        assert_eq!(list.worktrees.len(), 1);
        assert_eq!(list.worktrees[0].branch, "main");
    }

    #[test]
    fn test_parse_bare_attribute_ignored() {
        let output = "worktree /repo\nbare\n\nworktree /repo.worktrees/auth\nHEAD def\nbranch refs/heads/auth\n\n";
        let list = parse_worktree_list(output);
        assert_eq!(list.worktrees.len(), 2);
        assert_eq!(list.worktrees[0].branch, DETACHED_BRANCH);
        assert_eq!(list.primary, Some(PathBuf::from("/repo")));
    }

    #[test]
    fn test_parse_empty_output() {
        let list = parse_worktree_list("");
        assert!(list.worktrees.is_empty());
        assert!(list.primary.is_none());
    }

    #[test]
    fn test_list_worktrees_fails_outside_git() {
        let temp = tempfile::tempdir().unwrap();
        let err = list_worktrees(temp.path()).unwrap_err();
        match err {
            CrewError::NotAProject { path, .. } => assert_eq!(path, temp.path()),
            other => panic!("expected NotAProject, got {other:?}"),
        }
    }
}
