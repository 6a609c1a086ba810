//! Produces compact, self-describing tokens from an intent payload,
//! binding an Ed25519 private key to a stable issuer identifier.

use std::sync::Arc;

use uuid::Uuid;
use vouch_core::{
    base64url_encode, sha256_hex, Clock, DelegationLink, Header, Identifier, KeyPair, PublicKeyJwk,
    Result, SignerConfig, SystemClock, Token, VouchEnvelope, VouchError, PROTOCOL_VERSION,
};

pub struct VouchSigner {
    keypair: KeyPair,
    identifier: Identifier,
    config: SignerConfig,
    clock: Arc<dyn Clock>,
}

impl VouchSigner {
    pub fn new(keypair: KeyPair, identifier: Identifier, config: SignerConfig) -> Result<Self> {
        Self::with_clock(keypair, identifier, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        keypair: KeyPair,
        identifier: Identifier,
        config: SignerConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        Ok(Self {
            keypair,
            identifier,
            config,
            clock,
        })
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn public_key(&self) -> PublicKeyJwk {
        self.keypair.public_key().to_jwk()
    }

    /// Builds the claim set (subject binding, validity window, optional
    /// delegation chain), canonically serializes it, and signs
    /// `header.claims` with EdDSA.
    pub fn sign(
        &self,
        payload: serde_json::Value,
        expiry_seconds: Option<i64>,
        reputation_score: Option<u8>,
        parent_token: Option<&str>,
    ) -> Result<String> {
        let now = self.clock.now_unix();
        let expiry = expiry_seconds.unwrap_or(self.config.default_token_expiry);
        let jti = Uuid::new_v4().to_string();

        let delegation_chain = match parent_token {
            Some(raw) => Some(self.build_delegation_chain(raw, &payload, now)?),
            None => None,
        };

        let envelope = VouchEnvelope {
            version: PROTOCOL_VERSION.to_string(),
            payload,
            reputation_score: reputation_score.map(|s| s.clamp(0, 100)),
            delegation_chain,
        };

        let claims = vouch_core::Claims {
            jti,
            iss: self.identifier.to_string(),
            sub: self.identifier.to_string(),
            iat: now,
            nbf: now,
            exp: now + expiry,
            vouch: envelope,
        };

        let header = Header::new(self.identifier.to_string());
        Token::encode(&header, &claims, |msg| self.keypair.sign(msg).to_vec())
    }

    fn build_delegation_chain(
        &self,
        parent_raw: &str,
        payload: &serde_json::Value,
        now: i64,
    ) -> Result<Vec<DelegationLink>> {
        let parent = Token::parse(parent_raw)
            .map_err(|e| VouchError::InvalidParent(e.to_string()))?;

        let mut chain = parent.claims.vouch.delegation_chain.clone().unwrap_or_default();
        if chain.len() >= self.config.max_delegation_depth {
            return Err(VouchError::ChainTooDeep {
                depth: chain.len() + 1,
                max: self.config.max_delegation_depth,
            });
        }

        let intent_hash = sha256_hex(vouch_core::canonical_json(payload)?.as_bytes());
        chain.push(DelegationLink {
            iss: parent.claims.sub.clone(),
            sub: self.identifier.to_string(),
            intent: intent_hash,
            iat: now,
            signature: base64url_encode(&parent.signature),
        });
        Ok(chain)
    }
}
