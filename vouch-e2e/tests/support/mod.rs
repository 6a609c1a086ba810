//! Shared harness for wiring a full signer + verifier stack over
//! in-memory backends with a shared, advanceable clock.

use std::sync::Arc;
use std::time::Duration;

use vouch_core::{FixedClock, Identifier, KeyPair, PublicKey, SignerConfig, VerifierConfig};
use vouch_identity::StaticResolver;
use vouch_replay::MemoryReplayGuard;
use vouch_reputation::MemoryReputationStore;
use vouch_revocation::{MemoryRevocationStore, RevocationRegistry};
use vouch_signer::VouchSigner;
use vouch_verifier::Verifier;

pub struct Harness {
    pub clock: Arc<FixedClock>,
    pub resolver: StaticResolver,
    pub revocation: Arc<RevocationRegistry>,
    pub reputation: MemoryReputationStore,
}

impl Harness {
    pub fn new(start: i64) -> Self {
        let clock = Arc::new(FixedClock::new(start));
        Self {
            reputation: MemoryReputationStore::with_clock(clock.clone()),
            resolver: StaticResolver::new(),
            revocation: Arc::new(RevocationRegistry::with_clock(
                Arc::new(MemoryRevocationStore::new()),
                clock.clone(),
            )),
            clock,
        }
    }

    /// Generates a fresh keypair bound to `identifier`, registers its
    /// public key with the resolver, and returns a signer for it.
    pub fn issue(&mut self, identifier: &str) -> (VouchSigner, Identifier, PublicKey) {
        let kp = KeyPair::generate(None);
        let id = Identifier::new(identifier).unwrap();
        let pk = kp.public_key();
        self.resolver.insert(id.clone(), pk);
        let signer = VouchSigner::with_clock(kp, id.clone(), SignerConfig::default(), self.clock.clone()).unwrap();
        (signer, id, pk)
    }

    pub fn verifier(self) -> Verifier {
        let cache = Arc::new(vouch_cache::MemoryKeyCache::with_clock(
            1000,
            Duration::from_secs(300),
            self.clock.clone(),
        ));
        let replay = Arc::new(MemoryReplayGuard::with_clock(1000, self.clock.clone()));
        Verifier::with_clock(
            Arc::new(self.resolver),
            cache,
            replay,
            self.revocation,
            VerifierConfig::default(),
            self.clock,
        )
    }
}
