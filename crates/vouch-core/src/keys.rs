//! Ed25519 key material.

use ed25519_dalek::{Signer as _, SigningKey, Verifier as _, VerifyingKey, SIGNATURE_LENGTH};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VouchError};
use crate::identifier::Identifier;

/// The public half of a keypair, JWK-shaped for wire serialization
/// for the `publicKeyJwk` document field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyJwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
}

/// Wraps an `ed25519-dalek` verifying key with convenience conversions.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        VerifyingKey::from_bytes(bytes)
            .map(Self)
            .map_err(|e| VouchError::InvalidKey(e.to_string()))
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        if signature.len() != SIGNATURE_LENGTH {
            return Err(VouchError::InvalidSignature);
        }
        let mut sig_bytes = [0u8; SIGNATURE_LENGTH];
        sig_bytes.copy_from_slice(signature);
        let sig = ed25519_dalek::Signature::from_bytes(&sig_bytes);
        self.0
            .verify(message, &sig)
            .map_err(|_| VouchError::InvalidSignature)
    }

    pub fn to_jwk(&self) -> PublicKeyJwk {
        PublicKeyJwk {
            kty: "OKP".to_string(),
            crv: "Ed25519".to_string(),
            x: crate::token::base64url_encode(&self.to_bytes()),
        }
    }

    pub fn from_jwk(jwk: &PublicKeyJwk) -> Result<Self> {
        if jwk.kty != "OKP" || jwk.crv != "Ed25519" {
            return Err(VouchError::InvalidKey(format!(
                "unsupported key type: {}/{}",
                jwk.kty, jwk.crv
            )));
        }
        let bytes = crate::token::base64url_decode(&jwk.x)
            .map_err(|e| VouchError::InvalidKey(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| VouchError::InvalidKey("public key must be 32 bytes".into()))?;
        Self::from_bytes(&arr)
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PublicKey")
            .field(&crate::token::base64url_encode(&self.to_bytes()))
            .finish()
    }
}

/// An Ed25519 keypair, optionally bound to a stable identifier. Private
/// key material never leaves the owning `Signer`; `Debug` redacts it.
pub struct KeyPair {
    signing_key: SigningKey,
    identifier: Option<Identifier>,
}

impl KeyPair {
    pub fn generate(identifier: Option<Identifier>) -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self {
            signing_key,
            identifier,
        }
    }

    pub fn from_bytes(bytes: &[u8; 32], identifier: Option<Identifier>) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(bytes),
            identifier,
        }
    }

    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key())
    }

    pub fn identifier(&self) -> Option<&Identifier> {
        self.identifier.as_ref()
    }

    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("identifier", &self.identifier)
            .field("public_key", &self.public_key())
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_roundtrip() {
        let kp = KeyPair::generate(None);
        let sig = kp.sign(b"hello");
        kp.public_key().verify(b"hello", &sig).unwrap();
    }

    #[test]
    fn tampered_message_fails() {
        let kp = KeyPair::generate(None);
        let sig = kp.sign(b"hello");
        assert!(kp.public_key().verify(b"goodbye", &sig).is_err());
    }

    #[test]
    fn jwk_roundtrip() {
        let kp = KeyPair::generate(None);
        let jwk = kp.public_key().to_jwk();
        let restored = PublicKey::from_jwk(&jwk).unwrap();
        assert_eq!(kp.public_key(), restored);
    }

    #[test]
    fn debug_redacts_secret() {
        let kp = KeyPair::generate(None);
        let debug = format!("{:?}", kp);
        assert!(!debug.contains(&crate::token::base64url_encode(&kp.secret_bytes())));
        assert!(debug.contains("redacted"));
    }
}
