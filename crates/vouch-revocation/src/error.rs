use thiserror::Error;
use vouch_core::VouchError;

pub type Result<T> = std::result::Result<T, RevocationError>;

#[derive(Debug, Error)]
pub enum RevocationError {
    #[error("revocation store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("remote revocation fetch failed for {domain}: {reason}")]
    RemoteFetchFailed { domain: String, reason: String },
}

impl From<RevocationError> for VouchError {
    fn from(e: RevocationError) -> Self {
        VouchError::StoreUnavailable(e.to_string())
    }
}

#[cfg(feature = "distributed")]
pub(crate) fn watch(e: redis::RedisError) -> RevocationError {
    RevocationError::StoreUnavailable(e.to_string())
}
