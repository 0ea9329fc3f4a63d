//! Activity index over per-workspace session history.
//!
//! History lives in one directory per workspace (see
//! [`StorageConfig::workspace_history_dir`]), one `.jsonl` file per recorded
//! session. Only the count matters to reconciliation; content is opaque here.
//!
//! Pure read, tolerant of absence: a missing or unreadable directory counts
//! as zero history, never an error.

use crate::storage::StorageConfig;

/// Counts recorded sessions for the workspace at `workspace_path`.
pub fn session_count(storage: &StorageConfig, workspace_path: &str) -> u32 {
    let dir = storage.workspace_history_dir(workspace_path);

    match fs_err::read_dir(&dir) {
        Ok(entries) => entries
            .flatten()
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "jsonl"))
            .count() as u32,
        Err(_) => 0,
    }
}

/// Whether any historical activity exists for the workspace.
pub fn has_history(storage: &StorageConfig, workspace_path: &str) -> bool {
    session_count(storage, workspace_path) > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn storage_in(temp: &tempfile::TempDir) -> StorageConfig {
        StorageConfig::with_root(temp.path().to_path_buf())
    }

    fn record_session(storage: &StorageConfig, workspace: &str, name: &str) {
        let dir = storage.workspace_history_dir(workspace);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(name), "{}\n").unwrap();
    }

    #[test]
    fn test_missing_directory_counts_as_zero() {
        let temp = tempdir().unwrap();
        let storage = storage_in(&temp);
        assert_eq!(session_count(&storage, "/nowhere"), 0);
        assert!(!has_history(&storage, "/nowhere"));
    }

    #[test]
    fn test_counts_jsonl_files_only() {
        let temp = tempdir().unwrap();
        let storage = storage_in(&temp);

        record_session(&storage, "/repo", "a.jsonl");
        record_session(&storage, "/repo", "b.jsonl");
        record_session(&storage, "/repo", "notes.txt");

        assert_eq!(session_count(&storage, "/repo"), 2);
        assert!(has_history(&storage, "/repo"));
    }

    #[test]
    fn test_empty_directory_counts_as_zero() {
        let temp = tempdir().unwrap();
        let storage = storage_in(&temp);
        std::fs::create_dir_all(storage.workspace_history_dir("/repo")).unwrap();

        assert_eq!(session_count(&storage, "/repo"), 0);
    }

    #[test]
    fn test_workspaces_with_similar_paths_do_not_share_history() {
        let temp = tempdir().unwrap();
        let storage = storage_in(&temp);

        record_session(&storage, "/repo", "a.jsonl");
        assert_eq!(session_count(&storage, "/repo"), 1);
        assert_eq!(session_count(&storage, "/repo.worktrees/auth"), 0);
        assert_eq!(session_count(&storage, "/re/po"), 0);
    }
}
