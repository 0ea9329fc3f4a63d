//! Heartbeat publishing lifecycle for an agent process.
//!
//! The handle is explicit state: it is created once at startup and threaded
//! through every lifecycle-event handler by the caller. There is no global
//! "current heartbeat" singleton. Every event republishes the full record, so
//! readers always see a complete snapshot.

use std::path::PathBuf;

use chrono::Utc;

use super::record::{excerpt, ActivityStatus, HeartbeatRecord};
use super::store::HeartbeatStore;
use crate::error::{CrewError, Result};

/// How often owners are expected to call [`HeartbeatHandle::tick`].
/// The cadence itself is owned by the caller's event loop.
pub const REPUBLISH_INTERVAL_SECS: u64 = 30;

/// Identity of the agent process a heartbeat describes.
#[derive(Debug, Clone)]
pub struct AgentIdentity {
    pub process_id: u32,
    pub working_directory: PathBuf,
    pub workspace_name: String,
    pub repo: Option<String>,
    pub branch: Option<String>,
}

impl AgentIdentity {
    /// Identity of the calling process, with the workspace name derived from
    /// the final component of the working directory.
    pub fn current() -> Result<Self> {
        let working_directory = std::env::current_dir()
            .map_err(|e| CrewError::io("failed to read current directory", e))?;
        Ok(Self::for_process(std::process::id(), working_directory))
    }

    pub fn for_process(process_id: u32, working_directory: PathBuf) -> Self {
        let workspace_name = working_directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| working_directory.to_string_lossy().into_owned());
        AgentIdentity {
            process_id,
            working_directory,
            workspace_name,
            repo: None,
            branch: None,
        }
    }

    pub fn with_repo(mut self, repo: Option<String>, branch: Option<String>) -> Self {
        self.repo = repo;
        self.branch = branch;
        self
    }
}

/// Owner-side handle to one heartbeat record.
///
/// Each mutating method stamps `updated_at` and republishes, so the on-disk
/// record always reflects the latest state-changing event.
pub struct HeartbeatHandle {
    store: HeartbeatStore,
    record: HeartbeatRecord,
}

impl HeartbeatHandle {
    /// Publishes a fresh record for `identity` and returns the handle.
    pub fn register(store: HeartbeatStore, identity: AgentIdentity) -> Result<Self> {
        let mut record = HeartbeatRecord::new(
            identity.process_id,
            identity.working_directory.to_string_lossy().into_owned(),
            identity.workspace_name,
        );
        record.repo = identity.repo;
        record.branch = identity.branch;

        store.publish(&record)?;
        Ok(HeartbeatHandle { store, record })
    }

    /// Like [`register`](Self::register), but reuses an existing record for
    /// the same pid when one is present, preserving `created_at` and
    /// `turn_count`. This lets short-lived invocations publish on behalf of
    /// one long-running agent process.
    pub fn resume(store: HeartbeatStore, identity: AgentIdentity) -> Result<Self> {
        match store.get(identity.process_id) {
            Some(record) => Ok(HeartbeatHandle { store, record }),
            None => Self::register(store, identity),
        }
    }

    /// The current in-memory record.
    pub fn record(&self) -> &HeartbeatRecord {
        &self.record
    }

    /// Periodic republish. Keeps the record fresh without changing state.
    pub fn tick(&mut self) -> Result<()> {
        self.touch()
    }

    /// The agent started generating a response.
    pub fn response_started(&mut self) -> Result<()> {
        self.record.activity = ActivityStatus::Streaming;
        self.record.current_tool = None;
        self.touch()
    }

    /// The agent stopped generating a response.
    pub fn response_finished(&mut self) -> Result<()> {
        self.record.activity = ActivityStatus::Idle;
        self.record.current_tool = None;
        self.touch()
    }

    /// The agent began executing a named tool.
    pub fn tool_started(&mut self, tool: &str) -> Result<()> {
        self.record.activity = ActivityStatus::ExecutingTool;
        self.record.current_tool = Some(tool.to_string());
        self.touch()
    }

    /// The tool finished; the agent is back to generating its response.
    pub fn tool_finished(&mut self) -> Result<()> {
        self.record.activity = ActivityStatus::Streaming;
        self.record.current_tool = None;
        self.touch()
    }

    pub fn model_selected(&mut self, model: &str) -> Result<()> {
        self.record.model = Some(model.to_string());
        self.touch()
    }

    /// Records an inbound user message, capped at 200 characters.
    pub fn user_message(&mut self, text: &str) -> Result<()> {
        self.record.last_user_message = Some(excerpt(text));
        self.touch()
    }

    /// Records an outbound agent reply, capped at 200 characters.
    pub fn agent_reply(&mut self, text: &str) -> Result<()> {
        self.record.last_agent_reply = Some(excerpt(text));
        self.touch()
    }

    /// A conversational turn ended.
    pub fn turn_completed(&mut self) -> Result<()> {
        self.record.turn_count += 1;
        self.record.activity = ActivityStatus::Idle;
        self.record.current_tool = None;
        self.touch()
    }

    /// Associates the record with the process's own session log.
    pub fn link_history_file(&mut self, path: &str) -> Result<()> {
        self.record.history_file = Some(path.to_string());
        self.touch()
    }

    /// Clean shutdown: retract the record. Crashed owners skip this and are
    /// reclaimed by the next scan instead.
    pub fn retire(self) -> Result<()> {
        self.store.retract(self.record.process_id)
    }

    fn touch(&mut self) -> Result<()> {
        self.record.updated_at = Utc::now();
        self.store.publish(&self.record)
    }
}
