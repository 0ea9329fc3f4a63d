//! The on-disk heartbeat record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message excerpts stored in a record are capped at this many characters.
pub const EXCERPT_MAX_CHARS: usize = 200;

/// What the owning agent process is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityStatus {
    #[default]
    Idle,
    Streaming,
    ExecutingTool,
}

/// Self-published description of one live agent process.
///
/// Stored as `<process_id>.json` in the heartbeats directory. The record is
/// authoritative only while its owning process is alive; liveness is always
/// re-derived from the OS, so there is no expiry field to go stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatRecord {
    pub process_id: u32,
    /// Absolute path of the workspace the process operates in.
    pub working_directory: String,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    /// Display label for the workspace.
    pub workspace_name: String,
    #[serde(default)]
    pub model: Option<String>,
    pub activity: ActivityStatus,
    /// Set only while `activity` is `executing-tool`.
    #[serde(default)]
    pub current_tool: Option<String>,
    #[serde(default)]
    pub last_user_message: Option<String>,
    #[serde(default)]
    pub last_agent_reply: Option<String>,
    /// Monotonically non-decreasing, incremented by the owner at turn end.
    #[serde(default)]
    pub turn_count: u32,
    /// Pointer to the process's own session log, if any.
    #[serde(default)]
    pub history_file: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HeartbeatRecord {
    pub fn new(process_id: u32, working_directory: String, workspace_name: String) -> Self {
        let now = Utc::now();
        HeartbeatRecord {
            process_id,
            working_directory,
            repo: None,
            branch: None,
            workspace_name,
            model: None,
            activity: ActivityStatus::Idle,
            current_tool: None,
            last_user_message: None,
            last_agent_reply: None,
            turn_count: 0,
            history_file: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Truncates message text to [`EXCERPT_MAX_CHARS`] characters.
pub(crate) fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_MAX_CHARS).collect()
}
