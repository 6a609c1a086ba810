//! L1 in-memory in front of an L2 distributed store. On L1 miss, falls
//! through to L2 and populates L1 on hit; sets write through to both
//! tiers concurrently.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use vouch_core::{Identifier, PublicKey};

use crate::cache::KeyCache;

pub struct TieredKeyCache<L1, L2> {
    l1: Arc<L1>,
    l2: Arc<L2>,
}

impl<L1, L2> TieredKeyCache<L1, L2>
where
    L1: KeyCache,
    L2: KeyCache,
{
    pub fn new(l1: Arc<L1>, l2: Arc<L2>) -> Self {
        Self { l1, l2 }
    }
}

#[async_trait]
impl<L1, L2> KeyCache for TieredKeyCache<L1, L2>
where
    L1: KeyCache,
    L2: KeyCache,
{
    async fn get(&self, key: &Identifier) -> Option<PublicKey> {
        if let Some(value) = self.l1.get(key).await {
            return Some(value);
        }
        let value = self.l2.get(key).await?;
        self.l1.set(key.clone(), value, None).await;
        Some(value)
    }

    async fn set(&self, key: Identifier, value: PublicKey, ttl: Option<Duration>) {
        futures::join!(
            self.l1.set(key.clone(), value, ttl),
            self.l2.set(key, value, ttl)
        );
    }

    async fn delete(&self, key: &Identifier) -> bool {
        let (l1_deleted, l2_deleted) = futures::join!(self.l1.delete(key), self.l2.delete(key));
        l1_deleted || l2_deleted
    }

    async fn clear(&self) {
        futures::join!(self.l1.clear(), self.l2.clear());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryKeyCache;
    use vouch_core::KeyPair;

    #[tokio::test]
    async fn l2_hit_populates_l1() {
        let l1 = Arc::new(MemoryKeyCache::new(10, Duration::from_secs(300)));
        let l2 = Arc::new(MemoryKeyCache::new(10, Duration::from_secs(300)));
        let tiered = TieredKeyCache::new(l1.clone(), l2.clone());

        let id = Identifier::new("id:web:example.com").unwrap();
        let key = KeyPair::generate(None).public_key();
        l2.set(id.clone(), key, None).await;

        assert_eq!(l1.get(&id).await, None);
        assert_eq!(tiered.get(&id).await, Some(key));
        assert_eq!(l1.get(&id).await, Some(key));
    }

    #[tokio::test]
    async fn set_writes_through_both_tiers() {
        let l1 = Arc::new(MemoryKeyCache::new(10, Duration::from_secs(300)));
        let l2 = Arc::new(MemoryKeyCache::new(10, Duration::from_secs(300)));
        let tiered = TieredKeyCache::new(l1.clone(), l2.clone());

        let id = Identifier::new("id:web:example.com").unwrap();
        let key = KeyPair::generate(None).public_key();
        tiered.set(id.clone(), key, None).await;

        assert_eq!(l1.get(&id).await, Some(key));
        assert_eq!(l2.get(&id).await, Some(key));
    }
}
