//! Revocation registry: marks identifiers as no longer trustworthy,
//! composing a local read-write store with an optional remote read-only
//! source.

pub mod error;
pub mod record;
pub mod registry;
pub mod remote;
pub mod store;

#[cfg(feature = "distributed")]
pub mod distributed;

pub use error::{RevocationError, Result};
pub use record::{RevocationDocument, RevocationRecord};
pub use registry::RevocationRegistry;
pub use remote::RemoteRevocationStore;
pub use store::{MemoryRevocationStore, RevocationStore};

#[cfg(feature = "distributed")]
pub use distributed::DistributedRevocationStore;
