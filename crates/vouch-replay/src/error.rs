use thiserror::Error;
use vouch_core::VouchError;

pub type Result<T> = std::result::Result<T, ReplayError>;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("replay guard store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<ReplayError> for VouchError {
    fn from(e: ReplayError) -> Self {
        VouchError::StoreUnavailable(e.to_string())
    }
}

/// Wraps a Redis error as a `ReplayError`, used by the distributed backend.
#[cfg(feature = "distributed")]
pub(crate) fn watch(e: redis::RedisError) -> ReplayError {
    ReplayError::StoreUnavailable(e.to_string())
}
