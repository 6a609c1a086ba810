use thiserror::Error;
use vouch_core::VouchError;

pub type Result<T> = std::result::Result<T, IdentityError>;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("unsupported identifier method: {0}")]
    UnsupportedMethod(String),

    #[error("http error resolving identifier: {0}")]
    HttpError(String),

    #[error("identity document not found")]
    NotFound,

    #[error("malformed identity document: {0}")]
    MalformedDocument(String),

    #[error("no Ed25519 verification method in document")]
    NoMatchingKey,
}

impl From<IdentityError> for VouchError {
    fn from(e: IdentityError) -> Self {
        VouchError::UnresolvableIdentifier(e.to_string())
    }
}
