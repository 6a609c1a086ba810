use thiserror::Error;
use vouch_core::VouchError;

pub type Result<T> = std::result::Result<T, CacheError>;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<CacheError> for VouchError {
    fn from(e: CacheError) -> Self {
        VouchError::StoreUnavailable(e.to_string())
    }
}
