//! Identity resolution: turns a domain-anchored agent identifier into a
//! current public key by fetching a well-known document.

pub mod document;
pub mod error;
pub mod resolver;

pub use document::{DidDocument, VerificationMethod};
pub use error::{IdentityError, Result};
pub use resolver::{did_web_to_url, DidWebResolver, IdentityResolver, StaticResolver};
