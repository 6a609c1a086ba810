//! Error taxonomy shared by every vouch crate.

use thiserror::Error;

/// Result alias used throughout the vouch workspace.
pub type Result<T> = std::result::Result<T, VouchError>;

/// Every distinct failure mode the core can produce. Deliberately not
/// collapsed into a generic variant: callers branch on these.
#[derive(Debug, Error)]
pub enum VouchError {
    /// Token did not decode into three well-formed base64url parts.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Signature did not verify against the resolved public key.
    #[error("invalid signature")]
    InvalidSignature,

    /// `now > exp + skew`.
    #[error("token expired")]
    Expired,

    /// `now < nbf - skew`.
    #[error("token not yet valid")]
    NotYetValid,

    /// Identity resolution and the key cache were both exhausted.
    #[error("unresolvable identifier: {0}")]
    UnresolvableIdentifier(String),

    /// Issuer is not in the trusted-roots table and resolution is disabled.
    #[error("untrusted issuer: {0}")]
    UntrustedIssuer(String),

    /// Some identifier in the delegation chain (including the final
    /// signer) is revoked and the revocation is already effective.
    #[error("revoked identifier: {0}")]
    Revoked(String),

    /// Token-id was already presented within its validity window.
    #[error("replayed token: {0}")]
    Replay(String),

    /// Delegation chain failed continuity or per-link signature checks.
    #[error("invalid delegation chain: {0}")]
    ChainInvalid(String),

    /// Delegation chain would exceed the configured maximum depth.
    #[error("delegation chain too deep: depth {depth}, max {max}")]
    ChainTooDeep { depth: usize, max: usize },

    /// A backing store (cache, replay guard, revocation, reputation) timed
    /// out or was otherwise unreachable.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Signer was constructed with a key that is not Ed25519, or similar
    /// precondition failure.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A supplied parent token could not be parsed for delegation.
    #[error("invalid parent token: {0}")]
    InvalidParent(String),

    /// Canonical JSON encode/decode failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
