//! Identity document (`did.json`) shapes.

use serde::{Deserialize, Serialize};
use vouch_core::PublicKeyJwk;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub key_type: String,
    pub controller: String,
    #[serde(rename = "publicKeyJwk")]
    pub public_key_jwk: PublicKeyJwk,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DidDocument {
    pub id: String,
    #[serde(rename = "verificationMethod", default)]
    pub verification_method: Vec<VerificationMethod>,
    #[serde(default)]
    pub authentication: Vec<String>,
    #[serde(rename = "assertionMethod", default)]
    pub assertion_method: Vec<String>,
}

impl DidDocument {
    /// First verification method whose key type is OKP/Ed25519.
    pub fn first_ed25519_method(&self) -> Option<&VerificationMethod> {
        self.verification_method
            .iter()
            .find(|m| m.public_key_jwk.kty == "OKP" && m.public_key_jwk.crv == "Ed25519")
    }
}
