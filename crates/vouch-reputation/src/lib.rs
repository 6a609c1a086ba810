//! Reputation engine: maintains per-identifier trust scores reflecting
//! observed behavior, with bounded append-only history and time-based
//! decay.

pub mod error;
pub mod event;
pub mod event_stream;
pub mod score;
pub mod store;

#[cfg(feature = "distributed")]
pub mod distributed;

pub use error::{ReputationError, Result};
pub use event::{ActionType, ReputationEvent};
pub use event_stream::EventStreamReputationStore;
pub use score::{ReputationScore, ReputationSnapshot, Tier};
pub use store::{MemoryReputationStore, ReputationStore};

#[cfg(feature = "distributed")]
pub use distributed::DistributedReputationStore;
