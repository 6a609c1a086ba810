use thiserror::Error;
use vouch_core::VouchError;

pub type Result<T> = std::result::Result<T, ReputationError>;

#[derive(Debug, Error)]
pub enum ReputationError {
    #[error("reputation store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<ReputationError> for VouchError {
    fn from(e: ReputationError) -> Self {
        VouchError::StoreUnavailable(e.to_string())
    }
}

#[cfg(feature = "distributed")]
pub(crate) fn watch(e: redis::RedisError) -> ReputationError {
    ReputationError::StoreUnavailable(e.to_string())
}
