//! Pluggable key cache: sub-millisecond public-key lookups by identifier,
//! bounded in size, with in-memory, distributed, and tiered backends.

pub mod cache;
pub mod error;
pub mod memory;
pub mod tiered;

#[cfg(feature = "distributed")]
pub mod distributed;

pub use cache::KeyCache;
pub use error::{CacheError, Result};
pub use memory::MemoryKeyCache;
pub use tiered::TieredKeyCache;

#[cfg(feature = "distributed")]
pub use distributed::DistributedKeyCache;
