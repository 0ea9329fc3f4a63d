//! # crew-core
//!
//! Core library for crew: discovery and liveness reconciliation for agent
//! processes working in isolated git worktrees of a shared project.
//!
//! Three independently-sourced layers are merged into one consistent entity
//! set per reconciliation pass:
//!
//! - git's worktree listing (what workspaces exist),
//! - the heartbeat store (which workspaces have a live agent, and what it is
//!   doing right now),
//! - the activity index (which workspaces have recorded history on disk).
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. Clients can wrap with
//!   async if needed.
//! - **Coordinator-free**: Heartbeats are one file per process with
//!   atomic-replace writes and liveness-checked reads; no locks, no daemon.
//! - **Graceful degradation**: Corrupt records, dead owners, and missing
//!   history all degrade to safe defaults instead of erroring.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crew_core::{reconcile, StorageConfig};
//!
//! let storage = StorageConfig::default();
//! for workspace in reconcile(std::path::Path::new("."), &storage)? {
//!     println!("{} [{}]", workspace.display_name, workspace.branch);
//! }
//! ```

pub mod error;
pub mod heartbeat;
pub mod history;
pub mod reconcile;
pub mod storage;
pub mod workspaces;

pub use error::{CrewError, Result};
pub use heartbeat::{
    ActivityStatus, AgentIdentity, HeartbeatHandle, HeartbeatRecord, HeartbeatStore,
    EXCERPT_MAX_CHARS, REPUBLISH_INTERVAL_SECS,
};
pub use history::{has_history, session_count};
pub use reconcile::{reconcile, WorkspaceEntity};
pub use storage::{encode_workspace_path, StorageConfig};
pub use workspaces::{list_worktrees, Worktree, WorktreeList, DETACHED_BRANCH};
