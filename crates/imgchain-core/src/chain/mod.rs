pub mod commit;
pub mod model;
pub mod session;
pub mod verify;

pub use commit::{append_commit, CommitOutcome};
pub use model::{ChainedPayload, EditOp, FilterKind, HistoryEntry};
pub use session::{Session, SessionState};
pub use verify::{verify_chain, verify_live_hash};
