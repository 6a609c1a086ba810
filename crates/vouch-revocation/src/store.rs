//! `RevocationStore`: the local, authoritative, read-write side of the
//! registry.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::Result;
use crate::record::RevocationRecord;

#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn revoke(
        &self,
        identifier: &str,
        reason: &str,
        authority: Option<&str>,
        effective_from: Option<i64>,
        revoked_at: i64,
    ) -> Result<()>;

    async fn reinstate(&self, identifier: &str) -> Result<()>;

    async fn get(&self, identifier: &str) -> Result<Option<RevocationRecord>>;

    async fn list(&self) -> Result<Vec<RevocationRecord>>;
}

/// `RwLock<HashMap>`-backed store, mirroring the shape used throughout
/// this workspace's other in-memory stores.
#[derive(Default)]
pub struct MemoryRevocationStore {
    records: RwLock<HashMap<String, RevocationRecord>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
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
        self.records
            .write()
            .insert(identifier.to_string(), record);
        Ok(())
    }

    async fn reinstate(&self, identifier: &str) -> Result<()> {
        self.records.write().remove(identifier);
        Ok(())
    }

    async fn get(&self, identifier: &str) -> Result<Option<RevocationRecord>> {
        Ok(self.records.read().get(identifier).cloned())
    }

    async fn list(&self) -> Result<Vec<RevocationRecord>> {
        Ok(self.records.read().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn revoke_then_get_round_trips() {
        let store = MemoryRevocationStore::new();
        store
            .revoke("id:web:example.com", "leak", None, None, 100)
            .await
            .unwrap();
        let record = store.get("id:web:example.com").await.unwrap().unwrap();
        assert_eq!(record.reason, "leak");
    }

    #[tokio::test]
    async fn reinstate_removes_record() {
        let store = MemoryRevocationStore::new();
        store
            .revoke("id:web:example.com", "leak", None, None, 100)
            .await
            .unwrap();
        store.reinstate("id:web:example.com").await.unwrap();
        assert!(store.get("id:web:example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_returns_all_records() {
        let store = MemoryRevocationStore::new();
        store.revoke("id:web:a.com", "x", None, None, 1).await.unwrap();
        store.revoke("id:web:b.com", "y", None, None, 1).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 2);
    }
}
