//! In-memory LRU key cache. Ordered map keyed by identifier, capped at
//! `max_size`; eviction is oldest-first on overflow and access promotes an
//! entry to most-recently-used.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use vouch_core::{Clock, Identifier, PublicKey, SystemClock};

use crate::cache::KeyCache;

struct Entry {
    value: PublicKey,
    cached_at: i64,
    ttl_seconds: Option<i64>,
}

impl Entry {
    fn is_expired(&self, now: i64) -> bool {
        match self.ttl_seconds {
            Some(ttl) => now - self.cached_at > ttl,
            None => false,
        }
    }
}

/// All operations run in O(1) amortized behind a single mutex.
pub struct MemoryKeyCache {
    inner: Mutex<LruCache<Identifier, Entry>>,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl MemoryKeyCache {
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        Self::with_clock(max_size, default_ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(max_size: usize, default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let cap = NonZeroUsize::new(max_size).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            inner: Mutex::new(LruCache::new(cap)),
            default_ttl,
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyCache for MemoryKeyCache {
    async fn get(&self, key: &Identifier) -> Option<PublicKey> {
        let now = self.clock.now_unix();
        let mut guard = self.inner.lock();
        let expired = guard.get(key).map(|e| e.is_expired(now));
        match expired {
            Some(true) => {
                guard.pop(key);
                None
            }
            Some(false) => guard.get(key).map(|e| e.value),
            None => None,
        }
    }

    async fn set(&self, key: Identifier, value: PublicKey, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let entry = Entry {
            value,
            cached_at: self.clock.now_unix(),
            ttl_seconds: Some(ttl.as_secs() as i64),
        };
        self.inner.lock().put(key, entry);
    }

    async fn delete(&self, key: &Identifier) -> bool {
        self.inner.lock().pop(key).is_some()
    }

    async fn clear(&self) {
        self.inner.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vouch_core::{FixedClock, KeyPair};

    fn sample_key() -> (Identifier, PublicKey) {
        let id = Identifier::new("id:web:example.com").unwrap();
        let kp = KeyPair::generate(None);
        (id, kp.public_key())
    }

    #[tokio::test]
    async fn set_then_get_hits() {
        let cache = MemoryKeyCache::new(10, Duration::from_secs(300));
        let (id, key) = sample_key();
        cache.set(id.clone(), key, None).await;
        assert_eq!(cache.get(&id).await, Some(key));
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let cache = MemoryKeyCache::new(10, Duration::from_secs(300));
        let (id, key) = sample_key();
        cache.set(id.clone(), key, None).await;
        assert!(cache.delete(&id).await);
        assert_eq!(cache.get(&id).await, None);
    }

    #[tokio::test]
    async fn clear_empties_cache() {
        let cache = MemoryKeyCache::new(10, Duration::from_secs(300));
        let (id, key) = sample_key();
        cache.set(id, key, None).await;
        cache.clear().await;
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let clock = Arc::new(FixedClock::new(1_000));
        let cache = MemoryKeyCache::with_clock(10, Duration::from_secs(5), clock.clone());
        let (id, key) = sample_key();
        cache.set(id.clone(), key, None).await;
        assert_eq!(cache.get(&id).await, Some(key));
        clock.advance(6);
        assert_eq!(cache.get(&id).await, None);
    }

    #[tokio::test]
    async fn overflow_evicts_oldest() {
        let cache = MemoryKeyCache::new(1, Duration::from_secs(300));
        let (id_a, key_a) = sample_key();
        let id_b = Identifier::new("id:web:other.example").unwrap();
        let key_b = KeyPair::generate(None).public_key();

        cache.set(id_a.clone(), key_a, None).await;
        cache.set(id_b.clone(), key_b, None).await;

        assert_eq!(cache.get(&id_a).await, None);
        assert_eq!(cache.get(&id_b).await, Some(key_b));
    }
}
