//! Storage configuration and path management for crew.
//!
//! All on-disk locations are decided here:
//!
//! ```text
//! ~/.crew/
//! ├── heartbeats/          # one <pid>.json per live agent process
//! ├── history/
//! │   └── <encoded-path>/  # per-workspace session logs (*.jsonl)
//! └── logs/                # crew-hook log files
//! ```
//!
//! Production code uses `StorageConfig::default()`; tests inject a temp
//! directory with `StorageConfig::with_root()`.

use std::path::{Path, PathBuf};

/// Central configuration for all crew storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory for all crew data (default: ~/.crew)
    root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let home = dirs::home_dir().expect("Could not find home directory");
        Self {
            root: home.join(".crew"),
        }
    }
}

impl StorageConfig {
    /// Creates a StorageConfig with a custom root directory.
    /// Used for testing with temp directories.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    /// Returns the root directory for crew data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one heartbeat file per live agent process.
    pub fn heartbeats_dir(&self) -> PathBuf {
        self.root.join("heartbeats")
    }

    /// Root directory for per-workspace session history.
    pub fn history_dir(&self) -> PathBuf {
        self.root.join("history")
    }

    /// History directory for one workspace.
    /// Example: `/repo.worktrees/auth` -> `~/.crew/history/-srepo.worktrees-sauth`
    pub fn workspace_history_dir(&self, workspace_path: &str) -> PathBuf {
        self.history_dir().join(encode_workspace_path(workspace_path))
    }

    /// Directory for crew-hook log files.
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Ensures the root directory and standard subdirectories exist.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        fs_err::create_dir_all(&self.root)?;
        fs_err::create_dir_all(self.heartbeats_dir())?;
        fs_err::create_dir_all(self.history_dir())?;
        Ok(())
    }
}

/// Encodes an absolute workspace path into a filesystem-safe directory name.
///
/// The encoding is a per-character prefix code: the marker `-` is escaped
/// first (`-` -> `-h`), then path separators are substituted (`/` -> `-s`).
/// Every `-` in the output starts a two-character code, so two distinct
/// paths can never map to the same name. Whatever writes history and whatever
/// reads it must agree on this function.
///
/// Example: `/repo.worktrees/my-branch` -> `-srepo.worktrees-smy-hbranch`
pub fn encode_workspace_path(path: &str) -> String {
    let mut encoded = String::with_capacity(path.len() + 8);
    for ch in path.chars() {
        match ch {
            '-' => encoded.push_str("-h"),
            '/' => encoded.push_str("-s"),
            _ => encoded.push(ch),
        }
    }
    encoded
}

/// Decodes an encoded workspace path back to the original absolute path.
///
/// Exact inverse of [`encode_workspace_path`]. Returns `None` if the input
/// contains a dangling or unknown escape code.
pub fn decode_workspace_path(encoded: &str) -> Option<String> {
    let mut decoded = String::with_capacity(encoded.len());
    let mut chars = encoded.chars();
    while let Some(ch) = chars.next() {
        if ch != '-' {
            decoded.push(ch);
            continue;
        }
        match chars.next() {
            Some('h') => decoded.push('-'),
            Some('s') => decoded.push('/'),
            _ => return None,
        }
    }
    Some(decoded)
}
