//! Owned, lock-guarded shared state.
//!
//! Each registry serializes its own map behind a `tokio::sync::Mutex`; no
//! lock is ever held across a transport or backend await. Per-user event
//! ordering is enforced one level up (the transport router's chat locks).

pub mod directory;
pub mod ownership;
pub mod sessions;
pub mod workflow;

pub use directory::{BanSet, DirectoryEntry, UserDirectory};
pub use ownership::NumberRegistry;
pub use sessions::{Session, SessionRegistry};
pub use workflow::{RefreshBatches, WorkflowState, WorkflowStore};
