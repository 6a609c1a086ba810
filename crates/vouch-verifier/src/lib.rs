//! Token verifier: composes identity resolution, key caching, replay
//! protection, and revocation checking into a single `check_vouch`/
//! `verify` contract.

pub mod roots;
pub mod verifier;

pub use roots::TrustedRoots;
pub use verifier::Verifier;
