//! Error types for crew-core operations.
//!
//! Only failures the caller can act on become errors. Corrupt heartbeat
//! records, dead owners, inconclusive liveness probes, and missing history
//! directories are all recovered locally (reclaim, treat-as-alive, or zero
//! history) and never surface here.

use std::path::PathBuf;

/// All errors that can occur in crew-core operations.
#[derive(Debug, thiserror::Error)]
pub enum CrewError {
    /// The given root is not a git-managed project. Fatal to the current
    /// reconciliation pass only; distinguishable from "zero worktrees".
    #[error("Not a git project: {path}: {details}")]
    NotAProject { path: PathBuf, details: String },

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using CrewError.
pub type Result<T> = std::result::Result<T, CrewError>;

impl CrewError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        CrewError::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        CrewError::Json {
            context: context.into(),
            source,
        }
    }
}
