//! Composes a local read-write store with an optional remote read-only
//! source. `is_revoked` is true if *any* backend reports the identifier
//! revoked with an already-effective `effective_from`.
//!
//! Partial remote-fetch failure is fail-open with a logged warning;
//! failure of the local store is fail-closed (propagated as an error).

use std::sync::Arc;

use vouch_core::{Clock, SystemClock};

use crate::error::Result;
use crate::record::RevocationRecord;
use crate::remote::RemoteRevocationStore;
use crate::store::RevocationStore;

pub struct RevocationRegistry {
    local: Arc<dyn RevocationStore>,
    remote: Option<Arc<RemoteRevocationStore>>,
    clock: Arc<dyn Clock>,
}

impl RevocationRegistry {
    pub fn new(local: Arc<dyn RevocationStore>) -> Self {
        Self::with_clock(local, Arc::new(SystemClock))
    }

    pub fn with_clock(local: Arc<dyn RevocationStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            local,
            remote: None,
            clock,
        }
    }

    pub fn with_remote(local: Arc<dyn RevocationStore>, remote: Arc<RemoteRevocationStore>) -> Self {
        Self::with_remote_and_clock(local, remote, Arc::new(SystemClock))
    }

    pub fn with_remote_and_clock(
        local: Arc<dyn RevocationStore>,
        remote: Arc<RemoteRevocationStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            local,
            remote: Some(remote),
            clock,
        }
    }

    pub async fn revoke(
        &self,
        identifier: &str,
        reason: &str,
        authority: Option<&str>,
        effective_from: Option<i64>,
    ) -> Result<()> {
        self.local
            .revoke(identifier, reason, authority, effective_from, self.clock.now_unix())
            .await
    }

    pub async fn reinstate(&self, identifier: &str) -> Result<()> {
        self.local.reinstate(identifier).await
    }

    pub async fn get_revocation(&self, identifier: &str) -> Result<Option<RevocationRecord>> {
        self.local.get(identifier).await
    }

    pub async fn list_local_revocations(&self) -> Result<Vec<RevocationRecord>> {
        self.local.list().await
    }

    /// `true` if any backend reports `identifier` revoked and effective.
    /// Local-store failures propagate (fail-closed); remote-fetch
    /// failures are logged and treated as "not revoked by remote"
    /// (fail-open).
    pub async fn is_revoked(&self, identifier: &str) -> Result<bool> {
        let now = self.clock.now_unix();

        if let Some(record) = self.local.get(identifier).await? {
            if record.is_effective(now) {
                return Ok(true);
            }
        }

        if let Some(remote) = &self.remote {
            match remote.is_revoked(identifier, now).await {
                Ok(revoked) => return Ok(revoked),
                Err(e) => {
                    tracing::warn!(
                        identifier = %identifier,
                        error = %e,
                        "remote revocation fetch failed, treating as not-revoked"
                    );
                }
            }
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRevocationStore;

    #[tokio::test]
    async fn local_revocation_is_reported() {
        let registry = RevocationRegistry::new(Arc::new(MemoryRevocationStore::new()));
        registry.revoke("id:web:example.com", "leak", None, None).await.unwrap();
        assert!(registry.is_revoked("id:web:example.com").await.unwrap());
    }

    #[tokio::test]
    async fn unrevoked_identifier_reports_false() {
        let registry = RevocationRegistry::new(Arc::new(MemoryRevocationStore::new()));
        assert!(!registry.is_revoked("id:web:example.com").await.unwrap());
    }

    #[tokio::test]
    async fn future_effective_from_is_not_yet_revoked() {
        let clock = Arc::new(vouch_core::FixedClock::new(1_000));
        let registry = RevocationRegistry::with_clock(Arc::new(MemoryRevocationStore::new()), clock.clone());
        registry
            .revoke("id:web:example.com", "leak", None, Some(11_000))
            .await
            .unwrap();
        assert!(!registry.is_revoked("id:web:example.com").await.unwrap());

        clock.advance(10_001);
        assert!(registry.is_revoked("id:web:example.com").await.unwrap());
    }

    #[tokio::test]
    async fn reinstate_clears_revocation() {
        let registry = RevocationRegistry::new(Arc::new(MemoryRevocationStore::new()));
        registry.revoke("id:web:example.com", "leak", None, None).await.unwrap();
        registry.reinstate("id:web:example.com").await.unwrap();
        assert!(!registry.is_revoked("id:web:example.com").await.unwrap());
    }
}
