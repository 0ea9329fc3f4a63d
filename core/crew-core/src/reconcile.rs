//! Reconciliation of worktrees, heartbeats, and history into one entity set.
//!
//! Three independently-read layers are joined on workspace path:
//! git's worktree listing (ground truth for what exists), the heartbeat store
//! (who is alive and what they are doing), and the activity index (what
//! happened before). The output is a fresh view, recomputed every pass and
//! never persisted.
//!
//! Failure policy: only a failed git query is an error. Everything scoped to
//! a single workspace degrades to the safest default (absent heartbeat, zero
//! history) so one workspace can never knock the others out of the result.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::heartbeat::{HeartbeatRecord, HeartbeatStore};
use crate::history;
use crate::storage::StorageConfig;
use crate::workspaces::{self, WorktreeList};

/// One workspace with everything the three layers know about it.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceEntity {
    pub path: PathBuf,
    pub branch: String,
    /// Display label, derived from the final path component.
    pub display_name: String,
    /// True for exactly one workspace per project: the main worktree.
    pub is_primary: bool,
    /// True for the workspace the querying process itself runs from.
    pub is_observer_location: bool,
    pub heartbeat: Option<HeartbeatRecord>,
    pub has_history: bool,
    pub history_record_count: u32,
}

/// Produces one entity per worktree of the project at `project_root`, in the
/// order git reports them.
///
/// Read-only apart from the heartbeat scan's opportunistic reclamation.
/// Fails only when `project_root` is not a git-managed project.
pub fn reconcile(project_root: &Path, storage: &StorageConfig) -> Result<Vec<WorkspaceEntity>> {
    let list = workspaces::list_worktrees(project_root)?;
    let heartbeats = HeartbeatStore::new(storage.heartbeats_dir()).scan();
    let observer = std::env::current_dir()
        .ok()
        .and_then(|p| p.canonicalize().ok());

    tracing::debug!(
        worktrees = list.worktrees.len(),
        live_heartbeats = heartbeats.len(),
        "reconciliation pass"
    );

    Ok(merge(&list, heartbeats, observer.as_deref(), storage))
}

/// Joins pre-fetched layers. Split out so tests can drive it without git.
fn merge(
    list: &WorktreeList,
    heartbeats: Vec<HeartbeatRecord>,
    observer: Option<&Path>,
    storage: &StorageConfig,
) -> Vec<WorkspaceEntity> {
    // Index heartbeats by working directory; when several live processes
    // report the same directory, the most recently updated record wins.
    let mut by_dir: HashMap<String, HeartbeatRecord> = HashMap::new();
    for record in heartbeats {
        let key = normalize_path(&record.working_directory);
        match by_dir.get(&key) {
            Some(current) if current.updated_at >= record.updated_at => {}
            _ => {
                by_dir.insert(key, record);
            }
        }
    }

    let observer_key = observer.map(|p| normalize_path(&p.to_string_lossy()));

    list.worktrees
        .iter()
        .map(|worktree| {
            let path_str = worktree.path.to_string_lossy();
            let key = normalize_path(&path_str);

            let history_record_count = history::session_count(storage, &path_str);

            WorkspaceEntity {
                path: worktree.path.clone(),
                branch: worktree.branch.clone(),
                display_name: display_name(&worktree.path),
                is_primary: list.primary.as_deref() == Some(worktree.path.as_path()),
                is_observer_location: observer_key.as_deref() == Some(key.as_str()),
                heartbeat: by_dir.remove(&key),
                has_history: history_record_count > 0,
                history_record_count,
            }
        })
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Strips trailing slashes (except root) so `/repo` and `/repo/` join.
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heartbeat::ActivityStatus;
    use crate::workspaces::{Worktree, DETACHED_BRANCH};
    use tempfile::tempdir;

    fn storage_in(temp: &tempfile::TempDir) -> StorageConfig {
        StorageConfig::with_root(temp.path().to_path_buf())
    }

    fn list_of(paths: &[(&str, &str)]) -> WorktreeList {
        let worktrees: Vec<Worktree> = paths
            .iter()
            .map(|(path, branch)| Worktree {
                path: PathBuf::from(path),
                branch: branch.to_string(),
            })
            .collect();
        let primary = worktrees.first().map(|w| w.path.clone());
        WorktreeList { worktrees, primary }
    }

    fn record_session(storage: &StorageConfig, workspace: &str, name: &str) {
        let dir = storage.workspace_history_dir(workspace);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(name), "{}\n").unwrap();
    }

    fn heartbeat_at(dir: &str) -> HeartbeatRecord {
        HeartbeatRecord::new(std::process::id(), dir.to_string(), "test".to_string())
    }

    #[test]
    fn test_one_entity_per_worktree_with_unique_paths() {
        let temp = tempdir().unwrap();
        let storage = storage_in(&temp);
        let list = list_of(&[
            ("/repo", "main"),
            ("/repo.worktrees/auth", "auth"),
            ("/repo.worktrees/docs", "docs"),
        ]);

        let entities = merge(&list, Vec::new(), None, &storage);

        assert_eq!(entities.len(), 3);
        let mut paths: Vec<_> = entities.iter().map(|e| e.path.clone()).collect();
        paths.dedup();
        assert_eq!(paths.len(), 3);
        assert_eq!(entities.iter().filter(|e| e.is_primary).count(), 1);
        assert!(entities[0].is_primary);
    }

    #[test]
    fn test_primary_with_history_next_to_live_worktree() {
        let temp = tempdir().unwrap();
        let storage = storage_in(&temp);

        record_session(&storage, "/repo", "one.jsonl");
        record_session(&storage, "/repo", "two.jsonl");
        record_session(&storage, "/repo", "three.jsonl");

        let mut beat = heartbeat_at("/repo.worktrees/auth");
        beat.activity = ActivityStatus::ExecutingTool;
        beat.current_tool = Some("edit".to_string());

        let list = list_of(&[("/repo", "main"), ("/repo.worktrees/auth", "auth")]);
        let entities = merge(&list, vec![beat], None, &storage);

        assert_eq!(entities.len(), 2);

        let repo = &entities[0];
        assert!(repo.is_primary);
        assert!(repo.has_history);
        assert_eq!(repo.history_record_count, 3);
        assert!(repo.heartbeat.is_none());

        let auth = &entities[1];
        assert!(!auth.is_primary);
        assert!(!auth.has_history);
        assert_eq!(auth.history_record_count, 0);
        let beat = auth.heartbeat.as_ref().unwrap();
        assert_eq!(beat.activity, ActivityStatus::ExecutingTool);
        assert_eq!(beat.current_tool.as_deref(), Some("edit"));
    }

    #[test]
    fn test_detached_worktree_keeps_sentinel_branch() {
        let temp = tempdir().unwrap();
        let storage = storage_in(&temp);
        let list = list_of(&[("/repo", "main"), ("/repo.worktrees/spike", DETACHED_BRANCH)]);

        let entities = merge(&list, Vec::new(), None, &storage);
        assert_eq!(entities[1].branch, DETACHED_BRANCH);
    }

    #[test]
    fn test_observer_location_matches_at_most_one() {
        let temp = tempdir().unwrap();
        let storage = storage_in(&temp);
        let list = list_of(&[("/repo", "main"), ("/repo.worktrees/auth", "auth")]);

        let entities = merge(
            &list,
            Vec::new(),
            Some(Path::new("/repo.worktrees/auth")),
            &storage,
        );

        assert!(!entities[0].is_observer_location);
        assert!(entities[1].is_observer_location);
        assert_eq!(entities.iter().filter(|e| e.is_observer_location).count(), 1);
    }

    #[test]
    fn test_observer_outside_project_matches_none() {
        let temp = tempdir().unwrap();
        let storage = storage_in(&temp);
        let list = list_of(&[("/repo", "main")]);

        let entities = merge(&list, Vec::new(), Some(Path::new("/elsewhere")), &storage);
        assert!(entities.iter().all(|e| !e.is_observer_location));
    }

    #[test]
    fn test_heartbeat_joins_despite_trailing_slash() {
        let temp = tempdir().unwrap();
        let storage = storage_in(&temp);
        let list = list_of(&[("/repo", "main")]);

        let beat = heartbeat_at("/repo/");
        let entities = merge(&list, vec![beat], None, &storage);
        assert!(entities[0].heartbeat.is_some());
    }

    #[test]
    fn test_most_recent_heartbeat_wins_per_directory() {
        let temp = tempdir().unwrap();
        let storage = storage_in(&temp);
        let list = list_of(&[("/repo", "main")]);

        let mut older = heartbeat_at("/repo");
        older.model = Some("old".to_string());
        older.updated_at = chrono::Utc::now() - chrono::Duration::seconds(60);
        let mut newer = heartbeat_at("/repo");
        newer.model = Some("new".to_string());

        let entities = merge(&list, vec![older, newer], None, &storage);
        let beat = entities[0].heartbeat.as_ref().unwrap();
        assert_eq!(beat.model.as_deref(), Some("new"));
    }

    #[test]
    fn test_unmatched_heartbeats_are_ignored() {
        let temp = tempdir().unwrap();
        let storage = storage_in(&temp);
        let list = list_of(&[("/repo", "main")]);

        let beat = heartbeat_at("/somewhere/else");
        let entities = merge(&list, vec![beat], None, &storage);
        assert!(entities[0].heartbeat.is_none());
    }

    #[test]
    fn test_display_name_is_final_component() {
        let temp = tempdir().unwrap();
        let storage = storage_in(&temp);
        let list = list_of(&[("/repo", "main"), ("/repo.worktrees/auth", "auth")]);

        let entities = merge(&list, Vec::new(), None, &storage);
        assert_eq!(entities[0].display_name, "repo");
        assert_eq!(entities[1].display_name, "auth");
    }
}
