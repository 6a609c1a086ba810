//! Redis-backed key cache. TTL is enforced by the backing store itself;
//! read/write failures are logged and treated as a cache miss (fail-open
//! for reads, silent for writes).

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use vouch_core::{Identifier, PublicKey};

use crate::cache::KeyCache;
use crate::error::{CacheError, Result};

const KEY_PREFIX: &str = "vouch:keycache:";

fn namespaced(id: &Identifier) -> String {
    format!("{KEY_PREFIX}{}", id.as_str())
}

pub struct DistributedKeyCache {
    conn: redis::aio::ConnectionManager,
    default_ttl: Duration,
}

impl DistributedKeyCache {
    pub async fn connect(redis_url: &str, default_ttl: Duration) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| CacheError::StoreUnavailable(e.to_string()))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| CacheError::StoreUnavailable(e.to_string()))?;
        Ok(Self { conn, default_ttl })
    }
}

#[async_trait]
impl KeyCache for DistributedKeyCache {
    async fn get(&self, key: &Identifier) -> Option<PublicKey> {
        let mut conn = self.conn.clone();
        let result: std::result::Result<Option<String>, redis::RedisError> =
            conn.get(namespaced(key)).await;
        match result {
            Ok(Some(encoded)) => match vouch_core::base64url_decode(&encoded) {
                Ok(bytes) => {
                    let arr: [u8; 32] = bytes.try_into().ok()?;
                    PublicKey::from_bytes(&arr).ok()
                }
                Err(_) => None,
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "distributed key cache read failed, treating as miss");
                None
            }
        }
    }

    async fn set(&self, key: Identifier, value: PublicKey, ttl: Option<Duration>) {
        let mut conn = self.conn.clone();
        let ttl = ttl.unwrap_or(self.default_ttl);
        let encoded = vouch_core::base64url_encode(&value.to_bytes());
        let result: std::result::Result<(), redis::RedisError> = conn
            .set_ex(namespaced(&key), encoded, ttl.as_secs().max(1))
            .await;
        if let Err(e) = result {
            tracing::warn!(error = %e, "distributed key cache write failed");
        }
    }

    async fn delete(&self, key: &Identifier) -> bool {
        let mut conn = self.conn.clone();
        let result: std::result::Result<i64, redis::RedisError> =
            conn.del(namespaced(key)).await;
        result.unwrap_or_default() > 0
    }

    async fn clear(&self) {
        let mut conn = self.conn.clone();
        let pattern = format!("{KEY_PREFIX}*");
        let keys: std::result::Result<Vec<String>, redis::RedisError> =
            conn.keys(pattern).await;
        if let Ok(keys) = keys {
            if !keys.is_empty() {
                let _: std::result::Result<(), redis::RedisError> = conn.del(keys).await;
            }
        }
    }
}
