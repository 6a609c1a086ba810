//! Keyword-argument-style construction, mirroring the original
//! implementation's `Signer(private_key, identifier=..., default_expiry=...)`.

use std::sync::Arc;

use vouch_core::{Clock, Identifier, KeyPair, Result, SignerConfig, SystemClock};

use crate::signer::VouchSigner;

pub struct SignerBuilder {
    keypair: Option<KeyPair>,
    identifier: Option<Identifier>,
    config: SignerConfig,
    clock: Arc<dyn Clock>,
}

impl Default for SignerBuilder {
    fn default() -> Self {
        Self {
            keypair: None,
            identifier: None,
            config: SignerConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }
}

impl SignerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keypair(mut self, keypair: KeyPair) -> Self {
        self.keypair = Some(keypair);
        self
    }

    /// Overrides the identifier; if omitted, the keypair's own bound
    /// identifier is used.
    pub fn identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    pub fn default_expiry(mut self, seconds: i64) -> Self {
        self.config.default_token_expiry = seconds;
        self
    }

    pub fn max_delegation_depth(mut self, depth: usize) -> Self {
        self.config.max_delegation_depth = depth;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> Result<VouchSigner> {
        let keypair = self
            .keypair
            .ok_or_else(|| vouch_core::VouchError::InvalidKey("no keypair supplied".into()))?;
        let identifier = self
            .identifier
            .or_else(|| keypair.identifier().cloned())
            .ok_or_else(|| vouch_core::VouchError::InvalidKey("no identifier supplied".into()))?;
        VouchSigner::with_clock(keypair, identifier, self.config, self.clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_keypair_bound_identifier() {
        let id = Identifier::new("id:web:a.example").unwrap();
        let kp = KeyPair::generate(Some(id.clone()));
        let signer = SignerBuilder::new().keypair(kp).build().unwrap();
        assert_eq!(signer.identifier(), &id);
    }

    #[test]
    fn explicit_identifier_overrides_keypair_binding() {
        let bound = Identifier::new("id:web:bound.example").unwrap();
        let override_id = Identifier::new("id:web:override.example").unwrap();
        let kp = KeyPair::generate(Some(bound));
        let signer = SignerBuilder::new()
            .keypair(kp)
            .identifier(override_id.clone())
            .build()
            .unwrap();
        assert_eq!(signer.identifier(), &override_id);
    }

    #[test]
    fn missing_identifier_and_binding_fails() {
        let kp = KeyPair::generate(None);
        let result = SignerBuilder::new().keypair(kp).build();
        assert!(result.is_err());
    }
}
