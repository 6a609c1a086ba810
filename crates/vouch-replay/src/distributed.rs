//! Redis-backed replay guard. Presence with TTL replaces manual cleanup;
//! `check_and_mark` uses `SET NX EX` for atomicity.

use std::sync::Arc;

use async_trait::async_trait;
use redis::AsyncCommands;
use vouch_core::{Clock, SystemClock};

use crate::error::{watch, Result};
use crate::guard::ReplayGuard;

const KEY_PREFIX: &str = "vouch:replay:";

fn namespaced(id: &str) -> String {
    format!("{KEY_PREFIX}{id}")
}

pub struct DistributedReplayGuard {
    conn: redis::aio::ConnectionManager,
    clock: Arc<dyn Clock>,
}

impl DistributedReplayGuard {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        Self::connect_with_clock(redis_url, Arc::new(SystemClock)).await
    }

    pub async fn connect_with_clock(redis_url: &str, clock: Arc<dyn Clock>) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(watch)?;
        let conn = client.get_connection_manager().await.map_err(watch)?;
        Ok(Self { conn, clock })
    }

    /// `expires_at` is already grace-inflated by the caller (see
    /// `Verifier::run`), so the TTL is just the remaining time to live.
    fn ttl_for(&self, expires_at: i64, now: i64) -> i64 {
        (expires_at - now).max(1)
    }
}

#[async_trait]
impl ReplayGuard for DistributedReplayGuard {
    async fn is_used(&self, id: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.exists(namespaced(id)).await.map_err(watch)?;
        Ok(exists)
    }

    async fn mark_used(&self, id: &str, expires_at: i64) -> Result<()> {
        let mut conn = self.conn.clone();
        let now = self.clock.now_unix();
        let ttl = self.ttl_for(expires_at, now);
        let _: () = conn
            .set_ex(namespaced(id), "1", ttl as u64)
            .await
            .map_err(watch)?;
        Ok(())
    }

    async fn check_and_mark(&self, id: &str, expires_at: i64) -> Result<bool> {
        let mut conn = self.conn.clone();
        let now = self.clock.now_unix();
        let ttl = self.ttl_for(expires_at, now);
        let set: Option<String> = redis::cmd("SET")
            .arg(namespaced(id))
            .arg("1")
            .arg("NX")
            .arg("EX")
            .arg(ttl)
            .query_async(&mut conn)
            .await
            .map_err(watch)?;
        Ok(set.is_some())
    }

    async fn cleanup_expired(&self) -> Result<usize> {
        // Auto-expiration via Redis TTL replaces manual cleanup entirely.
        Ok(0)
    }
}
