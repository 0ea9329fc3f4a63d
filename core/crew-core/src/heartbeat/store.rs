//! File-backed heartbeat store with liveness reclamation.
//!
//! One file per record, named `<pid>.json`. Writers only ever touch their own
//! key, so the only race is a scan observing a record mid-retract; atomic
//! temp-file-plus-rename writes guarantee a reader never sees a torn record,
//! and a file vanishing between listing and reading is treated as already
//! reclaimed.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::probe::process_is_alive;
use super::record::HeartbeatRecord;
use crate::error::{CrewError, Result};

/// Shared registry of heartbeat records keyed by process id.
#[derive(Debug, Clone)]
pub struct HeartbeatStore {
    dir: PathBuf,
}

impl HeartbeatStore {
    pub fn new(dir: PathBuf) -> Self {
        HeartbeatStore { dir }
    }

    /// Directory the store reads and writes.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, pid: u32) -> PathBuf {
        self.dir.join(format!("{pid}.json"))
    }

    /// Idempotently overwrites the record at key `record.process_id`.
    ///
    /// Safe to call at a fixed interval and on every state change: the full
    /// content is written to a temp file in the same directory and renamed
    /// into place, so concurrent readers see either the old record or the new
    /// one, never a partial write.
    pub fn publish(&self, record: &HeartbeatRecord) -> Result<()> {
        fs_err::create_dir_all(&self.dir)
            .map_err(|e| CrewError::io("failed to create heartbeats directory", e))?;

        let content = serde_json::to_string_pretty(record)
            .map_err(|e| CrewError::json("failed to serialize heartbeat record", e))?;

        let mut temp_file = NamedTempFile::new_in(&self.dir)
            .map_err(|e| CrewError::io("failed to create heartbeat temp file", e))?;
        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| CrewError::io("failed to write heartbeat temp file", e))?;
        temp_file
            .flush()
            .map_err(|e| CrewError::io("failed to flush heartbeat temp file", e))?;
        temp_file
            .persist(self.record_path(record.process_id))
            .map_err(|e| CrewError::io("failed to persist heartbeat record", e.error))?;

        Ok(())
    }

    /// Idempotently removes the record for `pid`. Absent keys are not an error.
    pub fn retract(&self, pid: u32) -> Result<()> {
        match std::fs::remove_file(self.record_path(pid)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CrewError::io("failed to retract heartbeat record", e)),
        }
    }

    /// Reads the record for `pid` without reclaiming anything.
    ///
    /// Used by callers that need to resume a record they own across process
    /// invocations. Corrupt or missing files read as `None`.
    pub fn get(&self, pid: u32) -> Option<HeartbeatRecord> {
        let content = std::fs::read_to_string(self.record_path(pid)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Returns every currently valid record, reclaiming stale ones.
    ///
    /// A record is excluded (and best-effort deleted) when its content does
    /// not parse or its owning process is no longer running. Liveness comes
    /// from the OS probe, never from record content. Reclamation failures and
    /// files that vanish mid-scan are skipped silently; a scan never errors.
    pub fn scan(&self) -> Vec<HeartbeatRecord> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(dir = %self.dir.display(), error = %e, "heartbeat scan failed to list directory");
                }
                return Vec::new();
            }
        };

        let mut records = Vec::new();

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }

            // The filename is the authoritative key.
            let pid: u32 = match path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse().ok())
            {
                Some(pid) => pid,
                None => {
                    self.reclaim(&path, "not named by a process id");
                    continue;
                }
            };

            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                // Vanished between listing and reading: already reclaimed
                // by a concurrent scanner or retracted by its owner.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping unreadable heartbeat");
                    continue;
                }
            };

            let record: HeartbeatRecord = match serde_json::from_str(&content) {
                Ok(record) => record,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "reclaiming corrupt heartbeat");
                    self.reclaim(&path, "corrupt content");
                    continue;
                }
            };

            if record.process_id != pid {
                self.reclaim(&path, "record pid does not match filename");
                continue;
            }

            if !process_is_alive(pid) {
                self.reclaim(&path, "owner is dead");
                continue;
            }

            records.push(record);
        }

        records
    }

    /// Best-effort deletion of a reclaimable record. Concurrent reclaimers
    /// racing on the same key must not error, so failures are only logged.
    fn reclaim(&self, path: &Path, reason: &str) {
        match std::fs::remove_file(path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), reason, "reclaimed heartbeat record");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "failed to reclaim heartbeat record");
            }
        }
    }
}
