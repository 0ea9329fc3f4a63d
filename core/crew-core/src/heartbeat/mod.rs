//! Heartbeat presence registry.
//!
//! Each live agent process owns exactly one record in a shared directory and
//! rewrites it periodically and on every state change. Any process may scan
//! the directory; scanning reclaims records whose owner is dead or whose
//! content is corrupt. There is no coordinator and no cross-process locking:
//! atomic-replace-on-write plus liveness-check-on-read is the whole protocol.

mod probe;
mod publisher;
mod record;
mod store;

pub use probe::process_is_alive;
pub use publisher::{AgentIdentity, HeartbeatHandle, REPUBLISH_INTERVAL_SECS};
pub use record::{ActivityStatus, HeartbeatRecord, EXCERPT_MAX_CHARS};
pub use store::HeartbeatStore;
