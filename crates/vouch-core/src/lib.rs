//! Shared primitives for the vouch identity core.
//!
//! This crate has no opinion on storage or networking; it defines the
//! wire format (`Header`/`Claims`/`Token`/`Passport`), the canonical JSON
//! rules tokens are signed over, Ed25519 key handling, domain-anchored
//! identifiers, the crate-wide error taxonomy, and the shared
//! configuration structs. Every other `vouch-*` crate depends on this one
//! and nothing flows the other way.
//!
//! # Token format
//!
//! `base64url(header_json) "." base64url(claims_json) "." base64url(sig)`,
//! all base64url with no padding. See [`token::Token`].
//!
//! # Identifiers
//!
//! `id:<method>:<domain>[:<path>]`; only the `web` method is resolved by
//! this workspace (see `vouch-identity`). See [`identifier::Identifier`].

pub mod canonical;
pub mod clock;
pub mod config;
pub mod error;
pub mod identifier;
pub mod keys;
pub mod token;

pub use canonical::canonical_json;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{SignerConfig, VerifierConfig};
pub use error::{Result, VouchError};
pub use identifier::Identifier;
pub use keys::{KeyPair, PublicKey, PublicKeyJwk};
pub use token::{
    base64url_decode, base64url_encode, sha256_hex, Claims, DelegationLink, Header, Passport,
    Token, VouchEnvelope, MAX_DELEGATION_DEPTH, PROTOCOL_VERSION,
};
