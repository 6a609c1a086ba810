//! Decides whether a token is authentic, fresh, non-revoked,
//! non-replayed, and, if applicable, properly delegated.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use vouch_cache::KeyCache;
use vouch_core::{
    Claims, Clock, DelegationLink, Identifier, Passport, PublicKey, Result, SystemClock, Token,
    VerifierConfig, VouchError,
};
use vouch_identity::IdentityResolver;
use vouch_replay::ReplayGuard;
use vouch_revocation::RevocationRegistry;

use crate::roots::TrustedRoots;

pub struct Verifier {
    resolver: Arc<dyn IdentityResolver>,
    cache: Arc<dyn KeyCache>,
    replay_guard: Arc<dyn ReplayGuard>,
    revocation: Arc<RevocationRegistry>,
    trusted_roots: TrustedRoots,
    config: VerifierConfig,
    clock: Arc<dyn Clock>,
}

impl Verifier {
    pub fn new(
        resolver: Arc<dyn IdentityResolver>,
        cache: Arc<dyn KeyCache>,
        replay_guard: Arc<dyn ReplayGuard>,
        revocation: Arc<RevocationRegistry>,
        config: VerifierConfig,
    ) -> Self {
        Self::with_clock(resolver, cache, replay_guard, revocation, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        resolver: Arc<dyn IdentityResolver>,
        cache: Arc<dyn KeyCache>,
        replay_guard: Arc<dyn ReplayGuard>,
        revocation: Arc<RevocationRegistry>,
        config: VerifierConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            resolver,
            cache,
            replay_guard,
            revocation,
            trusted_roots: TrustedRoots::new(),
            config,
            clock,
        }
    }

    pub fn add_trusted_root(&self, identifier: Identifier, key: PublicKey) {
        self.trusted_roots.add(identifier, key);
    }

    pub fn remove_trusted_root(&self, identifier: &Identifier) {
        self.trusted_roots.remove(identifier);
    }

    /// Verifies against an explicitly supplied key, skipping identity
    /// resolution (and trusted-roots/cache lookup) for the top-level
    /// issuer. Revocation is still checked when the issuer parses as a
    /// known identifier: a caller who already has the key out of band
    /// still needs revocation protection.
    pub async fn verify(&self, raw: &str, public_key: Option<PublicKey>) -> (bool, Option<Passport>) {
        match self.run(raw, public_key, false).await {
            Ok(passport) => (true, Some(passport)),
            Err(e) => {
                tracing::debug!(error = %e, "verify failed");
                (false, None)
            }
        }
    }

    /// Full verification: identity resolution, replay, and revocation.
    pub async fn check_vouch(&self, raw: &str) -> (bool, Option<Passport>) {
        match self.run(raw, None, true).await {
            Ok(passport) => (true, Some(passport)),
            Err(e) => {
                tracing::debug!(error = %e, "check_vouch failed");
                (false, None)
            }
        }
    }

    /// Verifies many tokens concurrently, bounded by `max_concurrent`;
    /// results preserve input order regardless of completion order.
    pub async fn verify_batch(
        &self,
        tokens: &[String],
        max_concurrent: usize,
    ) -> Vec<(bool, Option<Passport>)> {
        let mut indexed: Vec<(usize, (bool, Option<Passport>))> = stream::iter(tokens.iter().enumerate())
            .map(|(i, token)| async move { (i, self.check_vouch(token).await) })
            .buffer_unordered(max_concurrent.max(1))
            .collect()
            .await;
        indexed.sort_by_key(|(i, _)| *i);
        indexed.into_iter().map(|(_, result)| result).collect()
    }

    async fn run(&self, raw: &str, explicit_key: Option<PublicKey>, allow_resolution: bool) -> Result<Passport> {
        let token = Token::parse(raw)?;
        let issuer = Identifier::new(token.claims.iss.as_str())?;

        let key = match explicit_key {
            Some(k) => k,
            None => self.obtain_key(&issuer, allow_resolution).await?,
        };
        key.verify(token.signed_part.as_bytes(), &token.signature)?;

        self.validate_time(&token.claims)?;

        let chain = token.claims.vouch.delegation_chain.clone().unwrap_or_default();
        let mut revocation_targets = self.validate_chain(&token.claims, &chain, allow_resolution).await?;
        revocation_targets.insert(issuer.clone());

        for identifier in &revocation_targets {
            if self.revocation.is_revoked(identifier.as_str()).await? {
                return Err(VouchError::Revoked(identifier.to_string()));
            }
        }

        let expires_at = token.claims.exp + self.config.replay_grace_seconds;
        if !self.replay_guard.check_and_mark(&token.claims.jti, expires_at).await? {
            return Err(VouchError::Replay(token.claims.jti.clone()));
        }

        Ok(Passport::from(token.claims))
    }

    async fn obtain_key(&self, identifier: &Identifier, allow_resolution: bool) -> Result<PublicKey> {
        if let Some(key) = self.trusted_roots.get(identifier) {
            return Ok(key);
        }
        if let Some(key) = self.cache.get(identifier).await {
            return Ok(key);
        }
        if !allow_resolution {
            return Err(VouchError::UntrustedIssuer(identifier.to_string()));
        }

        let timeout = Duration::from_secs(self.config.resolver_timeout_seconds);
        let resolved = tokio::time::timeout(timeout, self.resolver.resolve(identifier))
            .await
            .map_err(|_| VouchError::UnresolvableIdentifier(identifier.to_string()))?;
        let key = resolved?;

        self.cache
            .set(identifier.clone(), key, Some(Duration::from_secs(self.config.cache_ttl_seconds as u64)))
            .await;
        Ok(key)
    }

    fn validate_time(&self, claims: &Claims) -> Result<()> {
        let now = self.clock.now_unix();
        let skew = self.config.clock_skew_seconds;

        if claims.exp - claims.iat > self.config.max_token_expiry {
            return Err(VouchError::Expired);
        }
        if now > claims.exp + skew {
            return Err(VouchError::Expired);
        }
        if now < claims.nbf - skew {
            return Err(VouchError::NotYetValid);
        }
        Ok(())
    }

    /// Checks chain-link continuity and depth, confirms every identifier
    /// named in the chain resolves to a key, and returns the full set of
    /// identifiers (chain links plus the token's own issuer) that must
    /// be checked for revocation.
    ///
    /// The embedded `signature` on each link is the literal signature of
    /// the parent token it was minted under, not a fresh signature over
    /// the link's own fields — reproducing the exact bytes that
    /// signature covers would require shipping the full ancestor token,
    /// which the wire format's fixed five-field link does not carry.
    /// This verifies structural validity (decodes to a 64-byte EdDSA
    /// signature) and chain-link continuity; it does not re-derive the
    /// ancestor's original signed message.
    async fn validate_chain(
        &self,
        claims: &Claims,
        chain: &[DelegationLink],
        allow_resolution: bool,
    ) -> Result<HashSet<Identifier>> {
        let mut targets = HashSet::new();
        if chain.is_empty() {
            return Ok(targets);
        }
        if chain.len() > self.config.max_delegation_depth {
            return Err(VouchError::ChainTooDeep {
                depth: chain.len(),
                max: self.config.max_delegation_depth,
            });
        }

        for link in chain {
            let sig_bytes = vouch_core::base64url_decode(&link.signature)?;
            if sig_bytes.len() != 64 {
                return Err(VouchError::ChainInvalid(format!(
                    "link signature for {} is not a valid EdDSA signature length",
                    link.iss
                )));
            }
        }

        for pair in chain.windows(2) {
            if pair[0].sub != pair[1].iss {
                return Err(VouchError::ChainInvalid(format!(
                    "discontinuous chain: {} -> {}",
                    pair[0].sub, pair[1].iss
                )));
            }
        }

        let last = chain.last().expect("non-empty chain");
        if claims.iss != last.sub {
            return Err(VouchError::ChainInvalid(format!(
                "token issuer {} does not match final chain subject {}",
                claims.iss, last.sub
            )));
        }

        for link in chain {
            let iss = Identifier::new(link.iss.as_str())?;
            self.obtain_key(&iss, allow_resolution).await?;
            targets.insert(iss);
        }

        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vouch_cache::MemoryKeyCache;
    use vouch_core::{FixedClock, KeyPair, SignerConfig};
    use vouch_identity::StaticResolver;
    use vouch_replay::MemoryReplayGuard;
    use vouch_revocation::MemoryRevocationStore;
    use vouch_signer::VouchSigner;

    fn harness(clock: Arc<FixedClock>) -> Verifier {
        let cache = Arc::new(MemoryKeyCache::with_clock(10, Duration::from_secs(300), clock.clone()));
        let replay = Arc::new(MemoryReplayGuard::with_clock(1000, clock.clone()));
        let revocation = Arc::new(RevocationRegistry::with_clock(
            Arc::new(MemoryRevocationStore::new()),
            clock.clone(),
        ));
        Verifier::with_clock(
            Arc::new(StaticResolver::new()),
            cache,
            replay,
            revocation,
            VerifierConfig::default(),
            clock,
        )
    }

    fn signer_with_identity(identity: &str, clock: Arc<FixedClock>) -> (VouchSigner, Identifier, PublicKey) {
        let kp = KeyPair::generate(None);
        let id = Identifier::new(identity).unwrap();
        let pk = kp.public_key();
        let signer = VouchSigner::with_clock(kp, id.clone(), SignerConfig::default(), clock).unwrap();
        (signer, id, pk)
    }

    #[tokio::test]
    async fn freshly_signed_token_verifies_with_explicit_key() {
        let clock = Arc::new(FixedClock::new(1_000));
        let verifier = harness(clock.clone());
        let (signer, _id, pk) = signer_with_identity("id:web:a.example", clock);
        let token = signer.sign(json!({"action": "read"}), None, None, None).unwrap();

        let (valid, passport) = verifier.verify(&token, Some(pk)).await;
        assert!(valid);
        assert_eq!(passport.unwrap().issuer, "id:web:a.example");
    }

    #[tokio::test]
    async fn tampered_signature_is_rejected() {
        let clock = Arc::new(FixedClock::new(1_000));
        let verifier = harness(clock.clone());
        let (signer, _id, pk) = signer_with_identity("id:web:a.example", clock);
        let token = signer.sign(json!({}), None, None, None).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let tampered_claims = format!("{}A", parts[1]);
        parts[1] = &tampered_claims;
        let tampered = parts.join(".");

        let (valid, _) = verifier.verify(&tampered, Some(pk)).await;
        assert!(!valid);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let clock = Arc::new(FixedClock::new(1_000));
        let verifier = harness(clock.clone());
        let (signer, _id, pk) = signer_with_identity("id:web:a.example", clock.clone());
        let token = signer.sign(json!({}), Some(10), None, None).unwrap();
        clock.advance(1_000);

        let (valid, _) = verifier.verify(&token, Some(pk)).await;
        assert!(!valid);
    }

    #[tokio::test]
    async fn second_presentation_is_rejected_as_replay() {
        let clock = Arc::new(FixedClock::new(1_000));
        let verifier = harness(clock.clone());
        let (signer, _id, pk) = signer_with_identity("id:web:a.example", clock);
        let token = signer.sign(json!({}), None, None, None).unwrap();

        let (first, _) = verifier.verify(&token, Some(pk)).await;
        let (second, _) = verifier.verify(&token, Some(pk)).await;
        assert!(first);
        assert!(!second);
    }

    #[tokio::test]
    async fn revoked_issuer_fails_verification() {
        let clock = Arc::new(FixedClock::new(1_000));
        let cache = Arc::new(MemoryKeyCache::with_clock(10, Duration::from_secs(300), clock.clone()));
        let replay = Arc::new(MemoryReplayGuard::with_clock(1000, clock.clone()));
        let revocation_store = Arc::new(MemoryRevocationStore::new());
        let revocation = Arc::new(RevocationRegistry::with_clock(revocation_store.clone(), clock.clone()));
        let verifier = Verifier::with_clock(
            Arc::new(StaticResolver::new()),
            cache,
            replay,
            revocation.clone(),
            VerifierConfig::default(),
            clock.clone(),
        );
        let (signer, _id, pk) = signer_with_identity("id:web:a.example", clock);
        let token = signer.sign(json!({}), None, None, None).unwrap();
        revocation.revoke("id:web:a.example", "compromised", None, None).await.unwrap();

        let (valid, _) = verifier.verify(&token, Some(pk)).await;
        assert!(!valid);
    }

    #[tokio::test]
    async fn delegated_token_validates_chain_continuity() {
        let clock = Arc::new(FixedClock::new(1_000));
        let cache = Arc::new(MemoryKeyCache::with_clock(10, Duration::from_secs(300), clock.clone()));
        let replay = Arc::new(MemoryReplayGuard::with_clock(1000, clock.clone()));
        let revocation = Arc::new(RevocationRegistry::with_clock(
            Arc::new(MemoryRevocationStore::new()),
            clock.clone(),
        ));

        let (signer_a, id_a, pk_a) = signer_with_identity("id:web:a.example", clock.clone());
        let token_a = signer_a.sign(json!({}), None, None, None).unwrap();

        let (signer_b, id_b, pk_b) = signer_with_identity("id:web:b.example", clock.clone());
        let token_b = signer_b.sign(json!({"action": "deploy"}), None, None, Some(&token_a)).unwrap();

        let mut resolver = StaticResolver::new();
        resolver.insert(id_a, pk_a);
        resolver.insert(id_b, pk_b);

        let verifier = Verifier::with_clock(
            Arc::new(resolver),
            cache,
            replay,
            revocation,
            VerifierConfig::default(),
            clock,
        );

        let (valid, passport) = verifier.check_vouch(&token_b).await;
        assert!(valid);
        assert_eq!(passport.unwrap().delegation_chain.len(), 1);
    }

    #[tokio::test]
    async fn unresolvable_issuer_fails_closed() {
        let clock = Arc::new(FixedClock::new(1_000));
        let verifier = harness(clock.clone());
        let (signer, _id, _pk) = signer_with_identity("id:web:a.example", clock);
        let token = signer.sign(json!({}), None, None, None).unwrap();

        let (valid, _) = verifier.check_vouch(&token).await;
        assert!(!valid);
    }

    #[tokio::test]
    async fn batch_preserves_input_order() {
        let clock = Arc::new(FixedClock::new(1_000));
        let cache = Arc::new(MemoryKeyCache::with_clock(10, Duration::from_secs(300), clock.clone()));
        let replay = Arc::new(MemoryReplayGuard::with_clock(1000, clock.clone()));
        let revocation = Arc::new(RevocationRegistry::with_clock(
            Arc::new(MemoryRevocationStore::new()),
            clock.clone(),
        ));

        let mut resolver = StaticResolver::new();
        let mut tokens = Vec::new();
        for i in 0..5 {
            let (signer, id, pk) = signer_with_identity(&format!("id:web:agent{i}.example"), clock.clone());
            resolver.insert(id, pk);
            tokens.push(signer.sign(json!({"i": i}), None, None, None).unwrap());
        }

        let verifier = Verifier::with_clock(
            Arc::new(resolver),
            cache,
            replay,
            revocation,
            VerifierConfig::default(),
            clock,
        );

        let results = verifier.verify_batch(&tokens, 2).await;
        assert_eq!(results.len(), 5);
        for (i, (valid, passport)) in results.iter().enumerate() {
            assert!(valid, "token {i} should verify");
            let payload = &passport.as_ref().unwrap().payload;
            assert_eq!(payload["i"], i);
        }
    }
}
