//! Token signer: turns an intent payload into a compact, verifiable
//! vouch-token signed by an Ed25519 keypair bound to a stable identifier.

pub mod builder;
pub mod signer;

pub use builder::SignerBuilder;
pub use signer::VouchSigner;
