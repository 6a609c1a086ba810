//! In-memory replay guard: capacity-bounded map of token-id to expiry,
//! LRU-evicting on overflow, periodic sweep of expired entries.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use vouch_core::{Clock, SystemClock};

use crate::error::Result;
use crate::guard::ReplayGuard;

pub const DEFAULT_MAX_SIZE: usize = 100_000;
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

pub struct MemoryReplayGuard {
    inner: Mutex<LruCache<String, i64>>,
    evicted: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl MemoryReplayGuard {
    pub fn new(max_size: usize) -> Self {
        Self::with_clock(max_size, Arc::new(SystemClock))
    }

    pub fn with_clock(max_size: usize, clock: Arc<dyn Clock>) -> Self {
        let cap = NonZeroUsize::new(max_size).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            inner: Mutex::new(LruCache::new(cap)),
            evicted: AtomicU64::new(0),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn evicted_count(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }
}

impl Default for MemoryReplayGuard {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE)
    }
}

#[async_trait]
impl ReplayGuard for MemoryReplayGuard {
    async fn is_used(&self, id: &str) -> Result<bool> {
        let now = self.clock.now_unix();
        let mut guard = self.inner.lock();
        match guard.get(&id.to_string()) {
            Some(expires_at) if *expires_at > now => Ok(true),
            Some(_) => {
                guard.pop(id);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn mark_used(&self, id: &str, expires_at: i64) -> Result<()> {
        let mut guard = self.inner.lock();
        let was_full = guard.len() == guard.cap().get();
        let had_key = guard.contains(id);
        guard.put(id.to_string(), expires_at);
        if was_full && !had_key {
            self.evicted.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    async fn check_and_mark(&self, id: &str, expires_at: i64) -> Result<bool> {
        let now = self.clock.now_unix();
        let mut guard = self.inner.lock();
        if let Some(existing) = guard.get(&id.to_string()) {
            if *existing > now {
                return Ok(false);
            }
        }
        let was_full = guard.len() == guard.cap().get();
        let had_key = guard.contains(id);
        guard.put(id.to_string(), expires_at);
        if was_full && !had_key {
            self.evicted.fetch_add(1, Ordering::Relaxed);
        }
        Ok(true)
    }

    async fn cleanup_expired(&self) -> Result<usize> {
        let now = self.clock.now_unix();
        let mut guard = self.inner.lock();
        let expired: Vec<String> = guard
            .iter()
            .filter(|(_, expires_at)| **expires_at <= now)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            guard.pop(id);
        }
        Ok(expired.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vouch_core::FixedClock;

    #[tokio::test]
    async fn first_presentation_is_not_replay() {
        let guard = MemoryReplayGuard::new(10);
        assert!(guard.check_and_mark("tok-1", 2_000).await.unwrap());
    }

    #[tokio::test]
    async fn second_presentation_is_replay() {
        let guard = MemoryReplayGuard::new(10);
        assert!(guard.check_and_mark("tok-1", 2_000).await.unwrap());
        assert!(!guard.check_and_mark("tok-1", 2_000).await.unwrap());
    }

    #[tokio::test]
    async fn expired_entry_is_treated_as_unused() {
        let clock = Arc::new(FixedClock::new(1_000));
        let guard = MemoryReplayGuard::with_clock(10, clock.clone());
        assert!(guard.check_and_mark("tok-1", 1_005).await.unwrap());
        clock.advance(10);
        assert!(guard.check_and_mark("tok-1", 1_020).await.unwrap());
    }

    #[tokio::test]
    async fn overflow_counts_eviction() {
        let guard = MemoryReplayGuard::new(1);
        guard.mark_used("tok-1", 2_000).await.unwrap();
        guard.mark_used("tok-2", 2_000).await.unwrap();
        assert_eq!(guard.evicted_count(), 1);
    }

    #[tokio::test]
    async fn cleanup_sweeps_expired_entries() {
        let clock = Arc::new(FixedClock::new(1_000));
        let guard = MemoryReplayGuard::with_clock(10, clock.clone());
        guard.mark_used("tok-1", 1_005).await.unwrap();
        guard.mark_used("tok-2", 2_000).await.unwrap();
        clock.advance(10);
        let swept = guard.cleanup_expired().await.unwrap();
        assert_eq!(swept, 1);
        assert_eq!(guard.len(), 1);
    }
}
