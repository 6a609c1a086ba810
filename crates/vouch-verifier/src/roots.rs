//! Trusted-roots table: identifiers whose public key is known in advance
//! and consulted before any cache lookup or network resolution.
//!
//! Copy-on-write so a caller iterating or looking up keys mid-call never
//! observes a table mutated by a concurrent `add`/`remove`: readers
//! clone the `Arc` once and see a consistent snapshot for the rest of
//! their call.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use vouch_core::{Identifier, PublicKey};

#[derive(Default)]
pub struct TrustedRoots {
    inner: RwLock<Arc<HashMap<Identifier, PublicKey>>>,
}

impl TrustedRoots {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    pub fn add(&self, identifier: Identifier, key: PublicKey) {
        let mut guard = self.inner.write();
        let mut next = HashMap::clone(&guard);
        next.insert(identifier, key);
        *guard = Arc::new(next);
    }

    pub fn remove(&self, identifier: &Identifier) {
        let mut guard = self.inner.write();
        if guard.contains_key(identifier) {
            let mut next = HashMap::clone(&guard);
            next.remove(identifier);
            *guard = Arc::new(next);
        }
    }

    /// A consistent point-in-time view, cheap to take (one `Arc` clone).
    pub fn snapshot(&self) -> Arc<HashMap<Identifier, PublicKey>> {
        self.inner.read().clone()
    }

    pub fn get(&self, identifier: &Identifier) -> Option<PublicKey> {
        self.snapshot().get(identifier).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_get_round_trips() {
        let roots = TrustedRoots::new();
        let kp = vouch_core::KeyPair::generate(None);
        let id = Identifier::new("id:web:root.example").unwrap();
        roots.add(id.clone(), kp.public_key());
        assert_eq!(roots.get(&id), Some(kp.public_key()));
    }

    #[test]
    fn remove_clears_entry() {
        let roots = TrustedRoots::new();
        let kp = vouch_core::KeyPair::generate(None);
        let id = Identifier::new("id:web:root.example").unwrap();
        roots.add(id.clone(), kp.public_key());
        roots.remove(&id);
        assert_eq!(roots.get(&id), None);
    }

    #[test]
    fn snapshot_is_unaffected_by_later_mutation() {
        let roots = TrustedRoots::new();
        let kp = vouch_core::KeyPair::generate(None);
        let id = Identifier::new("id:web:root.example").unwrap();
        roots.add(id.clone(), kp.public_key());
        let snap = roots.snapshot();
        roots.remove(&id);
        assert!(snap.contains_key(&id));
        assert_eq!(roots.get(&id), None);
    }
}
