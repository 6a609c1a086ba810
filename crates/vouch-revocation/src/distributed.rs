//! Redis-backed revocation store. Records are stored as JSON under a
//! namespaced key; `list` relies on a side-index set since Redis has no
//! native way to enumerate by pattern efficiently at scale.

use async_trait::async_trait;
use redis::AsyncCommands;

use crate::error::{watch, Result};
use crate::record::RevocationRecord;
use crate::store::RevocationStore;

const KEY_PREFIX: &str = "vouch:revocation:";
const INDEX_KEY: &str = "vouch:revocation:index";

fn namespaced(identifier: &str) -> String {
    format!("{KEY_PREFIX}{identifier}")
}

pub struct DistributedRevocationStore {
    conn: redis::aio::ConnectionManager,
}

impl DistributedRevocationStore {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(watch)?;
        let conn = client.get_connection_manager().await.map_err(watch)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl RevocationStore for DistributedRevocationStore {
    async fn revoke(
        &self,
        identifier: &str,
        reason: &str,
        authority: Option<&str>,
        effective_from: Option<i64>,
        revoked_at: i64,
    ) -> Result<()> {
        let record = RevocationRecord {
            identifier: identifier.to_string(),
            revoked_at,
            reason: reason.to_string(),
            authority: authority.map(str::to_string),
            effective_from,
        };
        let json = serde_json::to_string(&record)
            .map_err(|e| crate::error::RevocationError::StoreUnavailable(e.to_string()))?;
        let mut conn = self.conn.clone();
        let _: () = conn.set(namespaced(identifier), json).await.map_err(watch)?;
        let _: () = conn.sadd(INDEX_KEY, identifier).await.map_err(watch)?;
        Ok(())
    }

    async fn reinstate(&self, identifier: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(namespaced(identifier)).await.map_err(watch)?;
        let _: () = conn.srem(INDEX_KEY, identifier).await.map_err(watch)?;
        Ok(())
    }

    async fn get(&self, identifier: &str) -> Result<Option<RevocationRecord>> {
        let mut conn = self.conn.clone();
        let json: Option<String> = conn.get(namespaced(identifier)).await.map_err(watch)?;
        match json {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| crate::error::RevocationError::StoreUnavailable(e.to_string())),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<RevocationRecord>> {
        let mut conn = self.conn.clone();
        let identifiers: Vec<String> = conn.smembers(INDEX_KEY).await.map_err(watch)?;
        let mut records = Vec::with_capacity(identifiers.len());
        for identifier in identifiers {
            if let Some(record) = self.get(&identifier).await? {
                records.push(record);
            }
        }
        Ok(records)
    }
}
